//! Token lifetime and claim configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Access and refresh token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// `iss` claim written into and expected on every token
    pub issuer: String,

    /// `aud` claim written into and expected on every token
    pub audience: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Allowed clock skew in seconds when checking `iat`/`exp`
    pub clock_tolerance: i64,

    /// Maximum accepted access token age in seconds, measured from `iat`
    pub max_token_age: i64,

    /// Issue a new refresh token on every refresh and revoke the old one
    #[serde(default)]
    pub rotate_refresh_on_use: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("warden"),
            audience: String::from("warden-clients"),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            clock_tolerance: 60,
            max_token_age: 900,
            rotate_refresh_on_use: false,
        }
    }
}

impl TokenConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let access_minutes: i64 = env_or("TOKEN_ACCESS_EXPIRY_MINUTES", 15);
        let refresh_days: i64 = env_or("TOKEN_REFRESH_EXPIRY_DAYS", 7);
        let max_age_minutes: i64 = env_or("TOKEN_MAX_AGE_MINUTES", access_minutes);

        Self {
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("TOKEN_AUDIENCE").unwrap_or(defaults.audience),
            access_token_expiry: access_minutes * 60,
            refresh_token_expiry: refresh_days * 86400,
            clock_tolerance: env_or("TOKEN_CLOCK_TOLERANCE_SECONDS", defaults.clock_tolerance),
            max_token_age: max_age_minutes * 60,
            rotate_refresh_on_use: env_or("TOKEN_ROTATE_REFRESH_ON_USE", false),
        }
    }

    /// Set access token expiry in minutes; the maximum age follows it
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self.max_token_age = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Enable or disable refresh token rotation
    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotate_refresh_on_use = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert_eq!(config.clock_tolerance, 60);
        assert!(!config.rotate_refresh_on_use);
    }

    #[test]
    fn test_token_config_builder() {
        let config = TokenConfig::default()
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14)
            .with_rotation(true);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.max_token_age, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(config.rotate_refresh_on_use);
    }
}
