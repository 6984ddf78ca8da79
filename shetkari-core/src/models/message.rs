use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Bot,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Bot => write!(f, "bot"),
        }
    }
}

/// A web citation attached to a bot reply, passed through from the provider
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSource {
    pub title: String,
    pub url: String,
}

impl ChatSource {
    pub fn new(title: String, url: String) -> Self {
        Self { title, url }
    }
}

/// One turn of a conversation. Rows are written once and never updated;
/// ordering within a session is by `timestamp` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: String,
    pub role: MessageRole,
    pub text: String,
    #[sqlx(json)]
    #[serde(default)]
    pub sources: Vec<ChatSource>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(session_id: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role: MessageRole::User,
            text,
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(session_id: String, text: String, sources: Vec<ChatSource>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role: MessageRole::Bot,
            text,
            sources,
            timestamp: Utc::now(),
        }
    }
}
