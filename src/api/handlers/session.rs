use crate::{
    api::handlers::extract_bearer_token,
    auth::{AuthError, TokenIssuer},
};
use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionInfo {
    pub sub: String,
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = [SessionInfo]),
        (status = 401, description = "Missing, invalid, or expired token"),
    ),
    tag = "auth"
)]
// axum handler for session introspection
#[instrument(skip_all)]
pub async fn session(
    issuer: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&headers).ok_or(AuthError::Unauthorized)?;
    let claims = issuer.verify(&token).ok_or(AuthError::Unauthorized)?;

    Ok(Json(SessionInfo {
        sub: claims.sub,
        username: claims.username,
    }))
}
