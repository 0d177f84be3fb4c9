//! Assistant reply generation behind a trait.
//!
//! The HTTP layer talks to `ReplyGenerator` only, so the canned responder can
//! be swapped for a real model-backed client without touching the handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who authored a chat message.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Produces the assistant's reply to a user message.
pub trait ReplyGenerator: Send + Sync {
    /// History is ordered oldest first and excludes `input`.
    fn reply(&self, history: &[ChatMessage], input: &str) -> String;
}

/// Placeholder responder that echoes the question into a fixed template.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedReplier;

impl ReplyGenerator for CannedReplier {
    fn reply(&self, _history: &[ChatMessage], input: &str) -> String {
        format!(
            "I understand you're asking about: '{input}'. As PolicyNav Pro, \
             I can help you navigate through complex policies and regulations. \
             Please provide more details so I can assist you better."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_reply_embeds_input() {
        let replier = CannedReplier;
        let reply = replier.reply(&[], "data retention rules");
        assert!(reply.contains("'data retention rules'"));
        assert!(reply.contains("PolicyNav Pro"));
    }

    #[test]
    fn canned_reply_ignores_history() {
        let replier = CannedReplier;
        let history = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
        ];
        let with = replier.reply(&history, "next question");
        let without = replier.reply(&[], "next question");
        assert_eq!(with, without);
    }

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::user("hi").role, Role::User);
        assert_eq!(ChatMessage::assistant("hello").role, Role::Assistant);
    }
}
