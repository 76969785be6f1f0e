//! Study material model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Uploaded file metadata
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Material {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub uploader_name: String,
    /// Filename as the uploader's browser sent it
    pub original_filename: String,
    /// Sanitized name the bytes were written under
    pub stored_filename: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

/// New material payload; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub uploader_id: Uuid,
    pub uploader_name: String,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_url: String,
}
