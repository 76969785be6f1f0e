//! Process configuration, read once at startup

use anyhow::{Context, Result};
use common::{cache::RedisConfig, database::DatabaseConfig};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::{password::PasswordHasherConfig, uploads::DEFAULT_ALLOWED_EXTENSIONS};

/// Where sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

impl std::str::FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(SessionBackend::Redis),
            "memory" => Ok(SessionBackend::Memory),
            other => anyhow::bail!("Unknown SESSION_BACKEND: {}", other),
        }
    }
}

/// Session and cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret the session and flash cookies are signed with
    pub secret_key: String,
    pub backend: SessionBackend,
    pub ttl_seconds: u64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SECRET_KEY`: Cookie signing secret (required)
    /// - `SESSION_BACKEND`: `redis` or `memory` (default: redis)
    /// - `SESSION_TTL_SECONDS`: Session lifetime (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable not set"))?;
        if secret_key.is_empty() {
            anyhow::bail!("SECRET_KEY must not be empty");
        }

        let backend = std::env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .parse()?;

        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(SessionConfig {
            secret_key,
            backend,
            ttl_seconds,
        })
    }
}

/// Upload directory settings
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    /// Lowercase extensions without the dot
    pub allowed_extensions: HashSet<String>,
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/study_materials"),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl UploadConfig {
    /// Create a new UploadConfig from environment variables
    ///
    /// # Environment Variables
    /// - `UPLOAD_FOLDER`: Upload directory (default: static/study_materials)
    /// - `ALLOWED_EXTENSIONS`: Comma separated allow-list
    /// - `MAX_UPLOAD_BYTES`: Request body limit for uploads (default: 16 MiB)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let upload_dir = std::env::var("UPLOAD_FOLDER")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let allowed_extensions = match std::env::var("ALLOWED_EXTENSIONS") {
            Ok(raw) => parse_extensions(&raw),
            Err(_) => defaults.allowed_extensions,
        };
        if allowed_extensions.is_empty() {
            anyhow::bail!("ALLOWED_EXTENSIONS must name at least one extension");
        }

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse().context("MAX_UPLOAD_BYTES must be an integer")?,
            Err(_) => defaults.max_upload_bytes,
        };

        Ok(UploadConfig {
            upload_dir,
            allowed_extensions,
            max_upload_bytes,
        })
    }
}

fn parse_extensions(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub uploads: UploadConfig,
    pub password: PasswordHasherConfig,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDRESS`: Listen address (default: 0.0.0.0:5000)
    /// - plus those read by each sub-config
    pub fn from_env() -> Result<Self> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        Ok(AppConfig {
            bind_address,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            session: SessionConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            password: PasswordHasherConfig::from_env()?,
        })
    }
}
