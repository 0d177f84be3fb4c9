//! Argon2id digests for passwords and security answers.
//!
//! The store never sees plaintext secrets; both columns hold PHC strings with
//! per-record random salts, and every comparison goes through `verify_secret`.

use crate::auth::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Digest a plaintext secret into a PHC string.
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Storage(anyhow::anyhow!("Failed to hash secret: {err}")))
}

/// Compare a plaintext secret against a stored PHC string.
///
/// Malformed stored hashes verify to false rather than erroring; a corrupt
/// row must never authenticate.
#[must_use]
pub fn verify_secret(secret: &str, phc: &str) -> bool {
    PasswordHash::new(phc).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    })
}
