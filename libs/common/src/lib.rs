//! Common library for the Study Hub application
//!
//! This crate provides the infrastructure pieces shared by the services:
//! PostgreSQL connectivity, the Redis-backed key/value cache that holds
//! sessions, and the store error type.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     println!("Database reachable: {}", health_check(&pool).await);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
