//! Identity service: registration, credential checks and session resolution

use common::error::DatabaseError;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{HubError, HubResult},
    models::{NewUser, User},
    password::PasswordHasher,
    repositories::UserStore,
    validation::{normalize_name, validate_email, validate_password},
};

/// Registers and authenticates users
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Create an account.
    ///
    /// The lookup catches the common case; the store's unique index catches
    /// two registrations racing past it.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> HubResult<User> {
        validate_email(email).map_err(HubError::InvalidInput)?;
        validate_password(password).map_err(HubError::InvalidInput)?;

        if self.users.find_by_email(email).await?.is_some() {
            info!("Registration rejected, email already in use: {}", email);
            return Err(HubError::AlreadyRegistered);
        }

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| HubError::Internal(e.to_string()))?;

        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
            name: normalize_name(name),
        };

        match self.users.insert(&new_user).await {
            Ok(user) => {
                info!("Registered user {} ({})", user.id, user.email);
                Ok(user)
            }
            Err(DatabaseError::UniqueViolation(_)) => Err(HubError::AlreadyRegistered),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and return the user's identifier.
    pub async fn authenticate(&self, email: &str, password: &str) -> HubResult<Uuid> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!("Failed login attempt");
            return Err(HubError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!("Failed login attempt");
            return Err(HubError::InvalidCredentials);
        }

        info!("User {} authenticated", user.id);
        Ok(user.id)
    }

    /// Look up the user a session points at.
    ///
    /// A malformed identifier is treated the same as a missing user.
    pub async fn resolve(&self, session_user_id: &str) -> HubResult<Option<User>> {
        let Ok(id) = Uuid::parse_str(session_user_id) else {
            return Ok(None);
        };
        Ok(self.users.find_by_id(id).await?)
    }
}
