//! Signing key configuration

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use super::{env_or, ConfigError, Environment};

/// Configuration for signing key pairs and their protection at rest
#[derive(Clone)]
pub struct KeyConfig {
    /// How long a freshly generated pair stays active for issuance, in seconds
    pub key_lifetime: i64,

    /// RSA modulus size in bits
    pub rsa_bits: usize,

    /// 32-byte AES key used to seal private keys before they are stored
    pub encryption_key: Vec<u8>,

    /// True when `encryption_key` was generated for this process only
    pub ephemeral: bool,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("key_lifetime", &self.key_lifetime)
            .field("rsa_bits", &self.rsa_bits)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            key_lifetime: 7200, // 2 hours
            rsa_bits: 2048,
            encryption_key: random_key(),
            ephemeral: true,
        }
    }
}

impl KeyConfig {
    /// Create from environment variables
    ///
    /// `KEY_ENCRYPTION_KEY` must hold 32 base64-encoded bytes. Outside of
    /// development a missing key is an error, since sealed keys written by
    /// one process could never be opened by the next.
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let (encryption_key, ephemeral) = match std::env::var("KEY_ENCRYPTION_KEY") {
            Ok(encoded) => (decode_key(&encoded)?, false),
            Err(_) if environment.is_development() => (random_key(), true),
            Err(_) => {
                return Err(ConfigError::Missing {
                    name: "KEY_ENCRYPTION_KEY".to_string(),
                })
            }
        };

        let rsa_bits: usize = env_or("KEY_RSA_BITS", 2048);
        if rsa_bits < 2048 {
            return Err(ConfigError::Invalid {
                name: "KEY_RSA_BITS".to_string(),
                message: format!("{} is below the 2048-bit minimum", rsa_bits),
            });
        }

        Ok(Self {
            key_lifetime: env_or("KEY_LIFETIME_SECONDS", 7200),
            rsa_bits,
            encryption_key,
            ephemeral,
        })
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>, ConfigError> {
    let key = BASE64
        .decode(encoded.trim())
        .map_err(|e| ConfigError::Invalid {
            name: "KEY_ENCRYPTION_KEY".to_string(),
            message: e.to_string(),
        })?;

    if key.len() != 32 {
        return Err(ConfigError::Invalid {
            name: "KEY_ENCRYPTION_KEY".to_string(),
            message: format!("expected 32 bytes, got {}", key.len()),
        });
    }

    Ok(key)
}

fn random_key() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}
