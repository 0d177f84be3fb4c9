use crate::{
    api::handlers::{valid_email, valid_password, SessionGranted},
    auth::{store, AuthError, TokenIssuer},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserSignup {
    username: String,
    email: String,
    password: String,
    security_question: String,
    security_answer: String,
}

#[utoipa::path(
    post,
    path = "/v1/user/signup",
    request_body = UserSignup,
    responses(
        (status = 201, description = "Account created, session granted", body = [SessionGranted]),
        (status = 400, description = "Missing or malformed fields"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "user"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    pool: Extension<SqlitePool>,
    issuer: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserSignup>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(user)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = user.email.trim().to_lowercase();
    let username = user.username.trim();
    let question = user.security_question.trim();
    let answer = user.security_answer.trim();

    if username.is_empty() || question.is_empty() || answer.is_empty() {
        return Err(AuthError::Validation(
            "All fields are required".to_string(),
        ));
    }

    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email".to_string()));
    }

    if !valid_password(&user.password) {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    store::create_account(&pool, username, &email, &user.password, question, answer).await?;

    debug!("Account created for {email}");

    // Signup doubles as the first login.
    store::record_login(&pool, &email).await;

    let token = issuer.issue(&email, username)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionGranted {
            token,
            username: username.to_string(),
        }),
    ))
}
