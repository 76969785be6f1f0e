//! Persistence for the three Study Hub collections
//!
//! Each collection sits behind a store trait. The PostgreSQL repositories are
//! what the server runs on; [`memory`] holds in-process equivalents used by
//! the test suites.

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Material, Message, NewMaterial, NewMessage, NewUser, User};

pub mod material;
pub mod memory;
pub mod message;
pub mod user;

pub use material::MaterialRepository;
pub use message::MessageRepository;
pub use user::UserRepository;

/// The `users` collection
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive lookup
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Fails with `DatabaseError::UniqueViolation` when the email is taken
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User>;
}

/// The `messages` collection
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, new_message: &NewMessage) -> DatabaseResult<Message>;

    /// Newest first, at most `limit` entries
    async fn latest(&self, limit: u32) -> DatabaseResult<Vec<Message>>;
}

/// The `materials` collection
#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn insert(&self, new_material: &NewMaterial) -> DatabaseResult<Material>;

    /// Newest first, unbounded
    async fn all(&self) -> DatabaseResult<Vec<Material>>;
}
