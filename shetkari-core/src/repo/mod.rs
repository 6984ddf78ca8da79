pub mod message_repo;

pub use message_repo::PgMessageRepository;

use crate::db::DatabaseError;
use crate::models::ChatMessage;
use async_trait::async_trait;

/// Storage boundary for chat messages. The service layer only talks to this
/// trait, so tests can substitute an in-memory store.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist one message and return the stored row.
    async fn insert(&self, message: &ChatMessage) -> Result<ChatMessage, DatabaseError>;

    /// Messages for a session, oldest first, capped at `limit`.
    async fn list_for_session(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError>;

    /// The `limit` most recent messages for a session, returned oldest first.
    async fn recent_for_session(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError>;
}
