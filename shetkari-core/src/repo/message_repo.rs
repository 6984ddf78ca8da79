use crate::db::DatabaseError;
use crate::models::ChatMessage;
use async_trait::async_trait;
use sqlx::PgPool;

use super::MessageRepository;

pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: &ChatMessage) -> Result<ChatMessage, DatabaseError> {
        let record = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, session_id, role, text, sources, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, session_id, role, text, sources, timestamp
            "#,
        )
        .bind(message.id)
        .bind(&message.session_id)
        .bind(message.role)
        .bind(&message.text)
        .bind(sqlx::types::Json(&message.sources))
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_for_session(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let records = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, role, text, sources, timestamp
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY timestamp ASC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn recent_for_session(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let mut records = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, role, text, sources, timestamp
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        records.reverse();

        Ok(records)
    }
}
