//! Configuration module
//!
//! Configuration is organized into areas:
//! - `token` - Token lifetimes, issuer and audience
//! - `keys` - Signing key lifetime and the key-encryption key
//! - `cache` - Redis configuration for the revocation store
//! - `cleanup` - Schedule of the background cleanup sweep
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection
//! - `server` - HTTP server configuration

pub mod cache;
pub mod cleanup;
pub mod database;
pub mod environment;
pub mod keys;
pub mod server;
pub mod token;

use thiserror::Error;

pub use cache::CacheConfig;
pub use cleanup::CleanupConfig;
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use keys::KeyConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;

/// Errors raised while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {name}")]
    Missing { name: String },

    #[error("Invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

/// Which storage backend the server wires up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Everything in process memory; state is lost on restart
    Memory,
    /// Keys and subjects in MySQL, revocation state in Redis
    Persistent,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "mysql" | "persistent" => Ok(StorageBackend::Persistent),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND".to_string(),
                message: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Storage backend selection
    pub storage: StorageBackend,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Token configuration
    pub token: TokenConfig,

    /// Signing key configuration
    pub keys: KeyConfig,

    /// Background cleanup schedule
    pub cleanup: CleanupConfig,
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Configuration assembled from environment variables and defaults
    /// * `Err(ConfigError)` - A required setting is missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let storage = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        Ok(Self {
            environment,
            server: ServerConfig::from_env(),
            storage,
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            token: TokenConfig::from_env(),
            keys: KeyConfig::from_env(environment)?,
            cleanup: CleanupConfig::from_env(),
        })
    }
}

/// Read an environment variable and parse it, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
