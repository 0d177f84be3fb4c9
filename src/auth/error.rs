//! Error taxonomy for account and session operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Failures surfaced by the credential store and token issuer.
///
/// Storage faults are converted here at the boundary; raw driver errors never
/// reach handler responses.
#[derive(Debug)]
pub enum AuthError {
    /// Malformed input, caught before reaching the store.
    Validation(String),
    /// Signup conflict on the unique email column.
    DuplicateEmail,
    /// Unknown email for a question lookup.
    NotFound,
    /// Bad password, bad security answer, or invalid/expired token.
    Unauthorized,
    /// Connection or query failure.
    Storage(anyhow::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::DuplicateEmail => write!(f, "Email already exists"),
            Self::NotFound => write!(f, "Email not found"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Storage(err) => write!(f, "Storage unavailable: {err}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.into())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::DuplicateEmail => (StatusCode::CONFLICT, "Email already exists".to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Email not found".to_string()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Storage(err) => {
                tracing::error!("Storage error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage unavailable".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

/// Map a driver unique-constraint violation to the domain conflict.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
