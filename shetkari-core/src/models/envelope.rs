use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{ChatMessage, ChatSource};

/// Inbound payload for a send operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Outbound payload for a send operation. Mirrors the stored bot message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: Uuid,
    pub message: String,
    #[serde(default)]
    pub sources: Vec<ChatSource>,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for ChatResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            message: message.text,
            sources: message.sources,
            timestamp: message.timestamp,
        }
    }
}

/// Outbound payload for a history lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_bot_message() {
        let sources = vec![ChatSource::new(
            "KVK advisory".to_string(),
            "https://example.org/kvk".to_string(),
        )];
        let message = ChatMessage::bot("s1".to_string(), "reply".to_string(), sources.clone());
        let response = ChatResponse::from(message.clone());

        assert_eq!(response.id, message.id);
        assert_eq!(response.message, "reply");
        assert_eq!(response.sources, sources);
        assert_eq!(response.timestamp, message.timestamp);
    }

    #[test]
    fn test_request_wire_field_names() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"namaskar","session_id":"abc"}"#).unwrap();
        assert_eq!(request.message, "namaskar");
        assert_eq!(request.session_id, "abc");
    }

    #[test]
    fn test_response_wire_field_names() {
        let message = ChatMessage::bot("s1".to_string(), "reply".to_string(), Vec::new());
        let value = serde_json::to_value(ChatResponse::from(message)).unwrap();

        let object = value.as_object().unwrap();
        assert!(object.contains_key("id"));
        assert!(object.contains_key("message"));
        assert!(object.contains_key("sources"));
        assert!(object.contains_key("timestamp"));
    }
}
