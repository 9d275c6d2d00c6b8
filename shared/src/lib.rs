//! Shared configuration and wire types for the Warden services
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CleanupConfig, ConfigError, DatabaseConfig, Environment, KeyConfig,
    ServerConfig, StorageBackend, TokenConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
