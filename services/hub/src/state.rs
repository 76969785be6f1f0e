//! Application state shared across handlers

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    identity::IdentityService,
    materials::MaterialService,
    messaging::MessagingService,
    password::PasswordHasher,
    realtime::ChatRoom,
    repositories::{MaterialStore, MessageStore, UserStore},
    session::{SessionManager, SessionStore},
    uploads::UploadStore,
};

/// Backing stores for the three collections and the sessions
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub messages: Arc<dyn MessageStore>,
    pub materials: Arc<dyn MaterialStore>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub messaging: MessagingService,
    pub materials: MaterialService,
    pub sessions: SessionManager,
    pub uploads: UploadStore,
    pub chat: ChatRoom,
    pub cookie_key: Key,
    pub max_upload_bytes: usize,
    /// Present when running against PostgreSQL; used by the health endpoint
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        hasher: PasswordHasher,
        uploads: UploadStore,
        secret_key: &str,
        session_ttl_seconds: u64,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            identity: IdentityService::new(stores.users, hasher),
            messaging: MessagingService::new(stores.messages),
            materials: MaterialService::new(stores.materials),
            sessions: SessionManager::new(stores.sessions, session_ttl_seconds),
            uploads,
            chat: ChatRoom::new(),
            cookie_key: cookie_key(secret_key),
            max_upload_bytes,
            db_pool: None,
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch the configured secret to the 64 bytes cookie signing needs.
fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_deterministic() {
        assert_eq!(
            cookie_key("secret").master(),
            cookie_key("secret").master()
        );
        assert_ne!(cookie_key("secret").master(), cookie_key("other").master());
    }
}
