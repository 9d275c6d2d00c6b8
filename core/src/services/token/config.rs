//! Configuration for the token service

use chrono::Duration;
use warden_shared::{KeyConfig, TokenConfig};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Expected and issued `iss`
    pub issuer: String,
    /// Expected and issued `aud`
    pub audience: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Allowed clock skew
    pub clock_tolerance: Duration,
    /// Maximum access token age measured from `iat`
    pub max_token_age: Duration,
    /// Replace the refresh token on every use
    pub rotate_refresh_on_use: bool,
    /// How long a key pair stays active for issuance
    pub key_lifetime: Duration,
    /// RSA modulus size for new key pairs
    pub rsa_bits: usize,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "warden".to_string(),
            audience: "warden-clients".to_string(),
            access_token_lifetime: Duration::minutes(15),
            refresh_token_lifetime: Duration::days(7),
            clock_tolerance: Duration::seconds(60),
            max_token_age: Duration::minutes(15),
            rotate_refresh_on_use: false,
            key_lifetime: Duration::hours(2),
            rsa_bits: 2048,
        }
    }
}

impl TokenServiceConfig {
    /// Build from the shared token and key settings
    pub fn from_settings(token: &TokenConfig, keys: &KeyConfig) -> Self {
        Self {
            issuer: token.issuer.clone(),
            audience: token.audience.clone(),
            access_token_lifetime: Duration::seconds(token.access_token_expiry),
            refresh_token_lifetime: Duration::seconds(token.refresh_token_expiry),
            clock_tolerance: Duration::seconds(token.clock_tolerance),
            max_token_age: Duration::seconds(token.max_token_age),
            rotate_refresh_on_use: token.rotate_refresh_on_use,
            key_lifetime: Duration::seconds(keys.key_lifetime),
            rsa_bits: keys.rsa_bits,
        }
    }

    /// How long a pair must be kept after leaving its active window
    ///
    /// The longest-lived token a pair signs is a refresh token issued just
    /// before the window closed.
    pub fn key_retention(&self) -> Duration {
        self.refresh_token_lifetime.max(self.access_token_lifetime) + self.clock_tolerance
    }
}
