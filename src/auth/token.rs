//! Stateless session tokens.
//!
//! A token is the sole authorization artifact for an authenticated session:
//! bearer, unpersisted, revocable only by expiry. Verification collapses
//! every failure cause into absent; callers gate on presence alone.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// Claim bundle carried by a session token.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject email.
    pub sub: String,
    /// Display username.
    pub username: String,
    /// Absolute expiry instant, seconds since the epoch.
    pub exp: usize,
}

/// Mints and verifies HS256 session tokens under the configured secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl TokenIssuer {
    /// Build an issuer from the externally supplied secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_minutes: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_minutes,
        }
    }

    /// Issue a token for a freshly authenticated account.
    pub fn issue(&self, email: &str, username: &str) -> Result<String, AuthError> {
        let exp = Utc::now().timestamp() + self.ttl_minutes * 60;

        let claims = Claims {
            sub: email.to_string(),
            username: username.to_string(),
            exp: usize::try_from(exp)
                .map_err(|err| AuthError::Storage(anyhow::anyhow!("invalid expiry: {err}")))?,
        };

        debug!("Issuing session token for {email}, expires in {}m", self.ttl_minutes);

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::Storage(anyhow::anyhow!("failed to sign token: {err}")))
    }

    /// Verify a presented token.
    ///
    /// Fails open to `None` on any decoding, signature, or expiry error;
    /// nothing ever propagates past this boundary.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret.to_string()), 30)
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let issuer = issuer("test-secret-key-12345");

        let token = issuer.issue("a@x.com", "alice").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > usize::try_from(Utc::now().timestamp()).unwrap());
    }

    #[test]
    fn garbage_token_verifies_to_absent() {
        let issuer = issuer("test-secret-key-12345");
        assert!(issuer.verify("invalid.token.here").is_none());
        assert!(issuer.verify("").is_none());
    }

    #[test]
    fn wrong_secret_verifies_to_absent() {
        let minted_by = issuer("secret-one");
        let verified_by = issuer("secret-two");

        let token = minted_by.issue("a@x.com", "alice").unwrap();
        assert!(verified_by.verify(&token).is_none());
    }

    #[test]
    fn expired_token_verifies_to_absent() {
        let issuer = issuer("test-secret-key-12345");

        // Past the default validation leeway.
        let exp = usize::try_from(Utc::now().timestamp() - 120).unwrap();
        let claims = Claims {
            sub: "a@x.com".to_string(),
            username: "alice".to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert!(issuer.verify(&token).is_none());
    }
}
