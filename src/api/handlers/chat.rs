use crate::{
    api::handlers::extract_bearer_token,
    auth::{AuthError, TokenIssuer},
    chat::{ChatMessage, ReplyGenerator},
};
use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChatRequest {
    message: String,
    /// Prior turns, oldest first. Optional; the canned responder ignores it.
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChatReply {
    pub reply: String,
}

#[utoipa::path(
    post,
    path = "/v1/chat",
    request_body = ChatRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Assistant reply", body = [ChatReply]),
        (status = 400, description = "Missing or empty message"),
        (status = 401, description = "Missing, invalid, or expired token"),
    ),
    tag = "chat"
)]
// axum handler for chat
#[instrument(skip_all)]
pub async fn chat(
    issuer: Extension<Arc<TokenIssuer>>,
    replier: Extension<Arc<dyn ReplyGenerator>>,
    headers: HeaderMap,
    payload: Option<Json<ChatRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&headers).ok_or(AuthError::Unauthorized)?;
    let claims = issuer.verify(&token).ok_or(AuthError::Unauthorized)?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let message = request.message.trim();
    if message.is_empty() {
        return Err(AuthError::Validation("Message is required".to_string()));
    }

    debug!("Chat message from {}", claims.sub);

    let reply = replier.reply(&request.history, message);

    Ok(Json(ChatReply { reply }))
}
