//! Password recovery in three steps: fetch the security question, verify the
//! answer for a reset ticket, redeem the ticket for a new password.

use crate::{
    api::handlers::{valid_email, valid_password},
    auth::{store, ticket, AuthError},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetStart {
    email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SecurityQuestion {
    pub question: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetVerify {
    email: String,
    answer: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetTicket {
    pub reset_ticket: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetFinish {
    reset_ticket: String,
    new_password: String,
}

#[utoipa::path(
    post,
    path = "/v1/user/reset/start",
    request_body = ResetStart,
    responses(
        (status = 200, description = "Security question for the account", body = [SecurityQuestion]),
        (status = 400, description = "Missing or malformed email"),
        (status = 404, description = "Email not registered"),
    ),
    tag = "reset"
)]
// axum handler for reset start
#[instrument(skip_all)]
pub async fn start(
    pool: Extension<SqlitePool>,
    payload: Option<Json<ResetStart>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = request.email.trim().to_lowercase();

    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email".to_string()));
    }

    let question = store::get_security_question(&pool, &email)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(SecurityQuestion { question }))
}

#[utoipa::path(
    post,
    path = "/v1/user/reset/verify",
    request_body = ResetVerify,
    responses(
        (status = 200, description = "Answer accepted, reset ticket minted", body = [ResetTicket]),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Wrong answer or unknown email"),
    ),
    tag = "reset"
)]
// axum handler for reset verify
#[instrument(skip_all)]
pub async fn verify(
    pool: Extension<SqlitePool>,
    payload: Option<Json<ResetVerify>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = request.email.trim().to_lowercase();
    let answer = request.answer.trim();

    if !valid_email(&email) || answer.is_empty() {
        return Err(AuthError::Validation(
            "Email and answer are required".to_string(),
        ));
    }

    // Unknown emails verify to false; both failures answer 401.
    if !store::verify_security_answer(&pool, &email, answer).await? {
        return Err(AuthError::Unauthorized);
    }

    let reset_ticket = ticket::issue_reset_ticket(&pool, &email).await?;

    debug!("Reset ticket minted for {email}");

    Ok(Json(ResetTicket { reset_ticket }))
}

#[utoipa::path(
    post,
    path = "/v1/user/reset/finish",
    request_body = ResetFinish,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Missing fields or weak password"),
        (status = 401, description = "Unknown, expired, or consumed ticket"),
    ),
    tag = "reset"
)]
// axum handler for reset finish
#[instrument(skip_all)]
pub async fn finish(
    pool: Extension<SqlitePool>,
    payload: Option<Json<ResetFinish>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if request.reset_ticket.trim().is_empty() {
        return Err(AuthError::Validation(
            "Reset ticket is required".to_string(),
        ));
    }

    if !valid_password(&request.new_password) {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let email =
        ticket::finish_password_reset(&pool, request.reset_ticket.trim(), &request.new_password)
            .await?
            .ok_or(AuthError::Unauthorized)?;

    debug!("Password replaced for {email}");

    Ok(StatusCode::NO_CONTENT)
}
