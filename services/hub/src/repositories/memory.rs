//! In-process stores backing the test suites
//!
//! Records are kept in insertion order, which doubles as the tiebreak when
//! two records share a timestamp.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MaterialStore, MessageStore, UserStore};
use crate::models::{Material, Message, NewMaterial, NewMessage, NewUser, User};

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users with exactly this email
    pub async fn count_by_email(&self, email: &str) -> usize {
        self.users
            .lock()
            .await
            .iter()
            .filter(|u| u.email == email)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMessageStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn insert(&self, new_message: &NewMessage) -> DatabaseResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: new_message.sender_id,
            sender_name: new_message.sender_name.clone(),
            content: new_message.content.clone(),
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn latest(&self, limit: u32) -> DatabaseResult<Vec<Message>> {
        let messages = self.messages.lock().await;
        Ok(messages.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMaterialStore {
    materials: Arc<Mutex<Vec<Material>>>,
}

impl MemoryMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MaterialStore for MemoryMaterialStore {
    async fn insert(&self, new_material: &NewMaterial) -> DatabaseResult<Material> {
        let material = Material {
            id: Uuid::new_v4(),
            uploader_id: new_material.uploader_id,
            uploader_name: new_material.uploader_name.clone(),
            original_filename: new_material.original_filename.clone(),
            stored_filename: new_material.stored_filename.clone(),
            file_url: new_material.file_url.clone(),
            created_at: Utc::now(),
        };
        self.materials.lock().await.push(material.clone());
        Ok(material)
    }

    async fn all(&self) -> DatabaseResult<Vec<Material>> {
        let materials = self.materials.lock().await;
        Ok(materials.iter().rev().cloned().collect())
    }
}
