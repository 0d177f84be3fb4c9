use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub token_ttl_minutes: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(token_secret: SecretString, token_ttl_minutes: i64) -> Self {
        Self {
            token_secret,
            token_ttl_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("secret".to_string()), 30);
        assert_eq!(args.token_secret.expose_secret(), "secret");
        assert_eq!(args.token_ttl_minutes, 30);
    }

    #[test]
    fn test_global_args_debug_redacts_secret() {
        let args = GlobalArgs::new(SecretString::from("secret".to_string()), 30);
        let debug = format!("{args:?}");
        assert!(debug.contains("REDACTED"));
    }
}
