//! Background cleanup configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Schedule for the periodic sweep of expired revocation state and key pairs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Seconds between sweeps
    pub interval_seconds: u64,

    /// Whether the sweep runs at all
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl CleanupConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            interval_seconds: env_or("CLEANUP_INTERVAL_SECONDS", defaults.interval_seconds),
            enabled: env_or("CLEANUP_ENABLED", defaults.enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_config_default() {
        let config = CleanupConfig::default();
        assert_eq!(config.interval_seconds, 3600);
        assert!(config.enabled);
    }
}
