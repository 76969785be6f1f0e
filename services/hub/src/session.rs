//! Server-side sessions
//!
//! A session is an opaque random token held by the browser that maps to
//! exactly one user identifier. The mapping lives in Redis with a TTL; an
//! in-process store can stand in when Redis is not wanted.

use anyhow::Result;
use async_trait::async_trait;
use common::cache::RedisPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Where session tokens are kept
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, token: &str, user_id: &str, ttl_seconds: u64) -> Result<()>;
    async fn get(&self, token: &str) -> Result<Option<String>>;
    async fn remove(&self, token: &str) -> Result<()>;
}

/// Sessions in Redis, one key per token
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, user_id: &str, ttl_seconds: u64) -> Result<()> {
        self.redis_pool
            .set(&Self::key(token), user_id, Some(ttl_seconds))
            .await
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        self.redis_pool.get(&Self::key(token)).await
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.redis_pool.delete(&Self::key(token)).await
    }
}

/// Sessions in process memory, lost on restart
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token: &str, user_id: &str, ttl_seconds: u64) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        // Sessions abandoned without logout are never read again.
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(
            token.to_string(),
            (user_id.to_string(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(token) {
            Some((user_id, expires)) if Instant::now() < *expires => Ok(Some(user_id.clone())),
            Some(_) => {
                entries.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.entries.lock().await.remove(token);
        Ok(())
    }
}

/// Session manager for handling user sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl_seconds: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Create a new session for a user and return its token
    pub async fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.store
            .put(&token, &user_id.to_string(), self.ttl_seconds)
            .await?;

        info!("Created session for user: {}", user_id);
        Ok(token)
    }

    /// The raw user identifier a token maps to
    ///
    /// Returned as stored; the identity service decides whether it parses.
    pub async fn user_id(&self, token: &str) -> Result<Option<String>> {
        self.store.get(token).await
    }

    /// Delete a session
    pub async fn destroy_session(&self, token: &str) -> Result<()> {
        self.store.remove(token).await?;
        info!("Destroyed session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() -> Result<()> {
        let sessions = SessionManager::new(Arc::new(MemorySessionStore::new()), 60);
        let user_id = Uuid::new_v4();

        let token = sessions.create_session(user_id).await?;
        assert_eq!(sessions.user_id(&token).await?, Some(user_id.to_string()));

        sessions.destroy_session(&token).await?;
        assert_eq!(sessions.user_id(&token).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_tokens_are_unique_per_login() -> Result<()> {
        let sessions = SessionManager::new(Arc::new(MemorySessionStore::new()), 60);
        let user_id = Uuid::new_v4();

        let first = sessions.create_session(user_id).await?;
        let second = sessions.create_session(user_id).await?;

        assert_ne!(first, second);
        sessions.destroy_session(&first).await?;
        assert_eq!(sessions.user_id(&second).await?, Some(user_id.to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_sessions_are_gone() -> Result<()> {
        let store = MemorySessionStore::new();
        store.put("token", "user", 0).await?;
        assert_eq!(store.get("token").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_prunes_abandoned_sessions() -> Result<()> {
        let store = MemorySessionStore::new();
        store.put("abandoned", "user-a", 0).await?;
        store.put("live", "user-b", 60).await?;

        let entries = store.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("live"));
        Ok(())
    }

    #[test]
    fn test_redis_key_layout() {
        assert_eq!(RedisSessionStore::key("abc"), "session:abc");
    }
}
