//! Message repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use chateo_core::error::{AppError, ErrorKind};
use chateo_core::{AppResult, Identity};
use chateo_entity::Message;

use crate::store::MessageStore;

/// Raw `messages` row.
#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: String,
    receiver_id: String,
    text: String,
    created_at: DateTime<Utc>,
    status: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            sender: Identity::new(row.sender_id),
            receiver: Identity::new(row.receiver_id),
            text: row.text,
            timestamp: row.created_at,
            status: row.status.parse()?,
        })
    }
}

/// Repository for message inserts and conversation history.
#[derive(Debug, Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageRepository {
    async fn insert_message(&self, message: &Message) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, sender_id, receiver_id, text, created_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(message.sender.as_str())
        .bind(message.receiver.as_str())
        .bind(&message.text)
        .bind(message.timestamp)
        .bind(message.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert message", e))?;
        Ok(())
    }

    async fn conversation(
        &self,
        a: &Identity,
        b: &Identity,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender_id, receiver_id, text, created_at, status FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $3",
        )
        .bind(a.as_str())
        .bind(b.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load conversation", e))?;

        let mut messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }
}
