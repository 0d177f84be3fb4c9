use crate::{api, cli::actions::Action, cli::globals::GlobalArgs};
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_secret,
            token_ttl_minutes,
        } => {
            let globals = GlobalArgs::new(token_secret, token_ttl_minutes);

            api::new(port, dsn, &globals).await?;
        }
    }

    Ok(())
}
