//! Error types for the Study Hub service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Everything a Study Hub operation can fail with
#[derive(Error, Debug)]
pub enum HubError {
    /// Registration with an email that already has an account
    #[error("Email already registered")]
    AlreadyRegistered,

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session missing, expired, or pointing at a user that no longer exists
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Upload request without a file part or with an empty filename
    #[error("No file selected for uploading")]
    NoFileSelected,

    /// Upload whose extension is not on the allow-list
    #[error("File type not allowed")]
    FileTypeNotAllowed,

    /// Upload whose name sanitizes to nothing
    #[error("Invalid filename")]
    InvalidFilename,

    /// Form input rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store could not be reached at startup
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store failure while serving a request
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Session cache failure
    #[error("Session error: {0}")]
    Session(#[source] anyhow::Error),

    /// Upload directory failure
    #[error("File storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Anything else that should never reach the user verbatim
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HubError {
    /// Text shown to the user in a flash notice.
    pub fn notice(&self) -> String {
        match self {
            HubError::AlreadyRegistered => "Email already registered.".to_string(),
            HubError::InvalidCredentials => "Invalid email or password.".to_string(),
            HubError::NotAuthenticated => {
                "You must be logged in to view the Study Hub.".to_string()
            }
            HubError::NoFileSelected => "No file selected for uploading.".to_string(),
            HubError::FileTypeNotAllowed => {
                "File upload failed. File type not allowed.".to_string()
            }
            HubError::InvalidFilename => {
                "File upload failed. The filename has no usable characters.".to_string()
            }
            HubError::InvalidInput(msg) => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the gateway should turn this into a notice and redirect.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HubError::AlreadyRegistered
                | HubError::InvalidCredentials
                | HubError::NotAuthenticated
                | HubError::NoFileSelected
                | HubError::FileTypeNotAllowed
                | HubError::InvalidFilename
                | HubError::InvalidInput(_)
        )
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = match &self {
            HubError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            HubError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HubError::AlreadyRegistered => StatusCode::CONFLICT,
            HubError::NoFileSelected
            | HubError::FileTypeNotAllowed
            | HubError::InvalidFilename
            | HubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HubError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, self.notice()).into_response()
    }
}

/// Type alias for Study Hub results
pub type HubResult<T> = Result<T, HubError>;
