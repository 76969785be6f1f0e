//! Message repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;

use super::MessageStore;
use crate::models::{Message, NewMessage};

/// Message repository
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, new_message: &NewMessage) -> DatabaseResult<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, sender_name, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, sender_name, content, created_at
            "#,
        )
        .bind(new_message.sender_id)
        .bind(&new_message.sender_name)
        .bind(&new_message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn latest(&self, limit: u32) -> DatabaseResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, sender_name, content, created_at
            FROM messages
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
