//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Chat message entity. `sender_name` is a snapshot taken at send time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Time of day the chat log shows, in UTC.
    pub fn display_time(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// New message payload; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
}
