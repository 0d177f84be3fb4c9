//! Short-lived, single-use password reset tickets.
//!
//! A ticket is minted only after a successful security-answer verification
//! and is the sole authorization for the password overwrite. The raw ticket
//! goes to the client; the database stores a SHA-256 hash. Redeeming the
//! ticket and overwriting the password commit in one transaction, so two
//! concurrent resets for the same account cannot both succeed on one ticket.

use anyhow::anyhow;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use tracing::Instrument;

use crate::auth::{error::is_unique_violation, password::hash_secret, AuthError};

/// Tickets outlive the recovery form, not much more.
pub const RESET_TICKET_TTL_SECONDS: i64 = 15 * 60;

/// Create a new random reset ticket.
/// The raw value is only returned to the verified caller; the database
/// stores a hash.
pub(crate) fn generate_reset_ticket() -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| AuthError::Storage(anyhow!("failed to generate reset ticket: {err}")))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a reset ticket so raw values never touch the database.
pub(crate) fn hash_reset_ticket(ticket: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(ticket.as_bytes());
    hasher.finalize().to_vec()
}

/// Mint a reset ticket for an email whose security answer was just verified.
pub async fn issue_reset_ticket(pool: &SqlitePool, email: &str) -> Result<String, AuthError> {
    let expires_at = Utc::now().timestamp() + RESET_TICKET_TTL_SECONDS;

    let query = r"
        INSERT INTO reset_tickets (email, ticket_hash, expires_at)
        VALUES (?1, ?2, ?3)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let ticket = generate_reset_ticket()?;
        let ticket_hash = hash_reset_ticket(&ticket);
        let result = sqlx::query(query)
            .bind(email)
            .bind(&ticket_hash)
            .bind(expires_at)
            .execute(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => return Ok(ticket),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err.into()),
        }
    }

    Err(AuthError::Storage(anyhow!(
        "failed to generate unique reset ticket"
    )))
}

/// Redeem a ticket and overwrite the account password in one transaction.
///
/// Returns the email the ticket was bound to, or `None` for unknown,
/// expired, or already-consumed tickets.
pub async fn finish_password_reset(
    pool: &SqlitePool,
    ticket: &str,
    new_password: &str,
) -> Result<Option<String>, AuthError> {
    let ticket_hash = hash_reset_ticket(ticket);
    let now = Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let query = r"
        UPDATE reset_tickets
        SET consumed_at = ?1
        WHERE ticket_hash = ?2
          AND consumed_at IS NULL
          AND expires_at > ?1
        RETURNING email
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(now)
        .bind(&ticket_hash)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await?;

    let Some(row) = row else {
        let _ = tx.rollback().await;
        return Ok(None);
    };
    let email: String = row.get("email");

    let password_phc = hash_secret(new_password)?;
    let query = "UPDATE users SET password = ?1 WHERE email = ?2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&password_phc)
        .bind(&email)
        .execute(&mut *tx)
        .instrument(span)
        .await?;

    tx.commit().await?;

    Ok(Some(email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        password::verify_secret,
        store::{create_account, find_by_email, test_pool},
    };

    async fn signup_alice(pool: &SqlitePool) {
        create_account(
            pool,
            "alice",
            "a@x.com",
            "longpass1",
            "What is your pet's name?",
            "Rex",
        )
        .await
        .unwrap();
    }

    #[test]
    fn hash_reset_ticket_stable() {
        let first = hash_reset_ticket("ticket");
        let second = hash_reset_ticket("ticket");
        let different = hash_reset_ticket("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[test]
    fn generated_tickets_are_unique() {
        let first = generate_reset_ticket().unwrap();
        let second = generate_reset_ticket().unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn redeem_replaces_password_once() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let ticket = issue_reset_ticket(&pool, "a@x.com").await.unwrap();

        let email = finish_password_reset(&pool, &ticket, "newpass1")
            .await
            .unwrap();
        assert_eq!(email.as_deref(), Some("a@x.com"));

        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert!(!verify_secret("longpass1", &account.password_phc));
        assert!(verify_secret("newpass1", &account.password_phc));

        // Single use: the same ticket cannot authorize a second overwrite.
        let second = finish_password_reset(&pool, &ticket, "evilpass1")
            .await
            .unwrap();
        assert!(second.is_none());
        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert!(verify_secret("newpass1", &account.password_phc));
    }

    #[tokio::test]
    async fn unknown_ticket_is_rejected() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let result = finish_password_reset(&pool, "made-up-ticket", "newpass1")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn expired_ticket_is_rejected() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let ticket = generate_reset_ticket().unwrap();
        let ticket_hash = hash_reset_ticket(&ticket);
        let expired_at = Utc::now().timestamp() - 1;
        sqlx::query("INSERT INTO reset_tickets (email, ticket_hash, expires_at) VALUES (?1, ?2, ?3)")
            .bind("a@x.com")
            .bind(&ticket_hash)
            .bind(expired_at)
            .execute(&pool)
            .await
            .unwrap();

        let result = finish_password_reset(&pool, &ticket, "newpass1")
            .await
            .unwrap();
        assert!(result.is_none());

        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert!(verify_secret("longpass1", &account.password_phc));
    }
}
