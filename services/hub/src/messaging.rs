//! Messaging service: the chat log of the single global room

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::HubResult,
    models::{Message, NewMessage},
    repositories::MessageStore,
};

/// Number of messages the hub page loads
pub const DEFAULT_RECENT_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct MessagingService {
    messages: Arc<dyn MessageStore>,
}

impl MessagingService {
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    /// Append a message. Content is stored as given, empty included.
    pub async fn post_message(
        &self,
        sender_id: Uuid,
        sender_name: &str,
        content: &str,
    ) -> HubResult<Message> {
        let message = self
            .messages
            .insert(&NewMessage {
                sender_id,
                sender_name: sender_name.to_string(),
                content: content.to_string(),
            })
            .await?;
        Ok(message)
    }

    /// The last `limit` messages, oldest first.
    pub async fn recent_messages(&self, limit: u32) -> HubResult<Vec<Message>> {
        let mut messages = self.messages.latest(limit).await?;
        messages.reverse();
        Ok(messages)
    }
}
