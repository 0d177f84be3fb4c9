use crate::{
    api::handlers::{valid_email, SessionGranted},
    auth::{password::verify_secret, store, AuthError, TokenIssuer},
};
use axum::{extract::Extension, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserLogin {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/v1/user/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Session granted", body = [SessionGranted]),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Unknown email or wrong password"),
    ),
    tag = "user"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<SqlitePool>,
    issuer: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserLogin>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(user)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = user.email.trim().to_lowercase();

    if !valid_email(&email) || user.password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password collapse into the same answer.
    let account = store::find_by_email(&pool, &email)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !verify_secret(&user.password, &account.password_phc) {
        return Err(AuthError::Unauthorized);
    }

    store::record_login(&pool, &email).await;

    let token = issuer.issue(&email, &account.username)?;

    debug!("Session granted for {email}");

    Ok(Json(SessionGranted {
        token,
        username: account.username,
    }))
}
