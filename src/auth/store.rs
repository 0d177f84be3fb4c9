//! Credential store over the single-file SQLite database.
//!
//! Every operation checks a pooled connection out for the duration of one
//! statement and releases it on return, success or error. There are no
//! cross-call transactions here; the only multi-statement unit in the crate
//! is reset-ticket redemption (see `ticket`).

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use tracing::{warn, Instrument};

use crate::auth::{
    error::is_unique_violation,
    password::{hash_secret, verify_secret},
    AuthError,
};

/// Credential fields needed to authenticate a login attempt.
#[derive(Debug)]
pub struct AccountCredentials {
    pub username: String,
    pub password_phc: String,
    pub login_count: i64,
}

/// Create the account and reset-ticket tables if they do not exist.
///
/// # Errors
///
/// Returns an error if either DDL statement fails.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    let query = r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            security_question TEXT NOT NULL,
            security_answer TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            last_login TIMESTAMP,
            login_count INTEGER DEFAULT 0
        )
    ";
    sqlx::query(query)
        .execute(pool)
        .await
        .context("failed to create users table")?;

    let query = r"
        CREATE TABLE IF NOT EXISTS reset_tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            ticket_hash BLOB NOT NULL UNIQUE,
            expires_at INTEGER NOT NULL,
            consumed_at INTEGER
        )
    ";
    sqlx::query(query)
        .execute(pool)
        .await
        .context("failed to create reset_tickets table")?;

    Ok(())
}

/// Insert a new account with digested password and security answer.
///
/// The security question is stored verbatim; both secrets are stored as
/// Argon2id PHC strings. Fails with `DuplicateEmail` when the email is
/// already registered.
pub async fn create_account(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
    question: &str,
    answer: &str,
) -> Result<(), AuthError> {
    // Pre-check gives the common conflict a clean answer; the UNIQUE index
    // remains the backstop for concurrent signups.
    if find_by_email(pool, email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let password_phc = hash_secret(password)?;
    let answer_phc = hash_secret(answer)?;

    let query = r"
        INSERT INTO users
            (username, email, password, security_question, security_answer)
        VALUES (?1, ?2, ?3, ?4, ?5)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );
    match sqlx::query(query)
        .bind(username)
        .bind(email)
        .bind(&password_phc)
        .bind(question)
        .bind(&answer_phc)
        .execute(pool)
        .instrument(span)
        .await
    {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(AuthError::DuplicateEmail),
        Err(err) => Err(err.into()),
    }
}

/// Look up login credentials by email.
pub async fn find_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<AccountCredentials>, AuthError> {
    let query = r"
        SELECT username, password, COALESCE(login_count, 0) AS login_count
        FROM users
        WHERE email = ?1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| AccountCredentials {
        username: row.get("username"),
        password_phc: row.get("password"),
        login_count: row.get("login_count"),
    }))
}

/// Stamp `last_login` and bump the login counter.
///
/// Best-effort telemetry: failures are logged and swallowed, never surfaced
/// to the caller.
pub async fn record_login(pool: &SqlitePool, email: &str) {
    let query = r"
        UPDATE users
        SET last_login = CURRENT_TIMESTAMP,
            login_count = COALESCE(login_count, 0) + 1
        WHERE email = ?1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );
    if let Err(err) = sqlx::query(query)
        .bind(email)
        .execute(pool)
        .instrument(span)
        .await
    {
        warn!("Failed to record login stats for {email}: {err}");
    }
}

/// Fetch the stored security question for an email, if registered.
pub async fn get_security_question(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<String>, AuthError> {
    let query = "SELECT security_question FROM users WHERE email = ?1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| row.get("security_question")))
}

/// Compare a plaintext answer against the stored digest.
///
/// Unknown emails verify to false; callers cannot distinguish a missing
/// account from a wrong answer here.
pub async fn verify_security_answer(
    pool: &SqlitePool,
    email: &str,
    answer: &str,
) -> Result<bool, AuthError> {
    let query = "SELECT security_answer FROM users WHERE email = ?1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.is_some_and(|row| verify_secret(answer, row.get("security_answer"))))
}

/// Overwrite the stored password digest.
///
/// Authorization is the caller's concern; handlers only reach this through a
/// consumed reset ticket.
pub async fn reset_password(
    pool: &SqlitePool,
    email: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let password_phc = hash_secret(new_password)?;

    let query = "UPDATE users SET password = ?1 WHERE email = ?2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(&password_phc)
        .bind(email)
        .execute(pool)
        .instrument(span)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn create_account_succeeds_once() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.login_count, 0);
        assert!(verify_secret("longpass1", &account.password_phc));
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let result = create_account(
            &pool,
            "bob",
            "a@x.com",
            "otherpass1",
            "What was your first car?",
            "Civic",
        )
        .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn find_by_email_absent_for_unknown() {
        let pool = test_pool().await;
        assert!(find_by_email(&pool, "nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_login_increments_counter() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        record_login(&pool, "a@x.com").await;
        record_login(&pool, "a@x.com").await;

        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(account.login_count, 2);
    }

    #[tokio::test]
    async fn record_login_for_unknown_email_is_silent() {
        let pool = test_pool().await;
        // No row matches; the call must neither error nor panic.
        record_login(&pool, "nobody@x.com").await;
    }

    #[tokio::test]
    async fn security_question_round_trip() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        let question = get_security_question(&pool, "a@x.com").await.unwrap();
        assert_eq!(question.as_deref(), Some("What is your pet's name?"));
        assert!(get_security_question(&pool, "nobody@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn security_answer_verification() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        assert!(verify_security_answer(&pool, "a@x.com", "Rex").await.unwrap());
        assert!(!verify_security_answer(&pool, "a@x.com", "Fido")
            .await
            .unwrap());
        assert!(!verify_security_answer(&pool, "nobody@x.com", "Rex")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn reset_password_replaces_digest() {
        let pool = test_pool().await;
        signup_alice(&pool).await;

        reset_password(&pool, "a@x.com", "newpass1").await.unwrap();

        let account = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert!(!verify_secret("longpass1", &account.password_phc));
        assert!(verify_secret("newpass1", &account.password_phc));
    }

    #[tokio::test]
    async fn reset_password_unknown_email_not_found() {
        let pool = test_pool().await;
        let result = reset_password(&pool, "nobody@x.com", "newpass1").await;
        assert!(matches!(result, Err(AuthError::NotFound)));
    }
}
