//! # Infrastructure Layer
//!
//! Persistent implementations of the storage contracts defined in
//! `warden_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL key pair store and subject resolver using SQLx
//! - **Cache**: Redis client and the Redis-backed revocation store

use warden_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and revocation storage
pub mod cache;

/// Configuration re-exported from the shared crate
pub mod config {
    pub use warden_shared::config::{CacheConfig, DatabaseConfig};
}

pub use cache::{RedisClient, RedisRevocationStore};
pub use database::{DatabasePool, MySqlKeyStore, MySqlSubjectResolver};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Serialization(e) => DomainError::Internal {
                message: format!("Corrupt stored data: {}", e),
            },
            other => DomainError::StorageUnavailable {
                message: other.to_string(),
            },
        }
    }
}
