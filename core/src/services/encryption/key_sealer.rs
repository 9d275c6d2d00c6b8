//! AES-256-GCM sealing of private keys before they reach storage

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::errors::{DomainError, DomainResult};

const NONCE_LEN: usize = 12;

/// Seals and opens private key material with a single key-encryption key
///
/// Sealed output is `base64(nonce || ciphertext || tag)`.
#[derive(Clone)]
pub struct KeySealer {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for KeySealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySealer").finish_non_exhaustive()
    }
}

impl KeySealer {
    /// Create a sealer from a 32-byte key
    ///
    /// # Returns
    ///
    /// * `Ok(KeySealer)` - Ready to seal and open
    /// * `Err(DomainError::Validation)` - The key is not 256 bits
    pub fn new(key: &[u8]) -> DomainResult<Self> {
        if key.len() != 32 {
            return Err(DomainError::Validation {
                message: "Key-encryption key must be 32 bytes (256 bits)".to_string(),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| DomainError::Internal {
            message: format!("Invalid key-encryption key: {}", e),
        })?;

        Ok(Self { cipher })
    }

    /// Create a sealer with a random key, for tests and throwaway processes
    pub fn ephemeral() -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    /// Encrypt `plaintext` under a fresh nonce
    pub fn seal(&self, plaintext: &[u8]) -> DomainResult<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| DomainError::Internal {
                message: format!("Sealing failed: {}", e),
            })?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    /// Decrypt a value produced by [`KeySealer::seal`]
    ///
    /// Fails if the value was sealed under another key or has been altered.
    pub fn open(&self, sealed: &str) -> DomainResult<Vec<u8>> {
        let raw = BASE64.decode(sealed).map_err(|e| DomainError::Internal {
            message: format!("Sealed key is not valid base64: {}", e),
        })?;

        if raw.len() <= NONCE_LEN {
            return Err(DomainError::Internal {
                message: "Sealed key is truncated".to_string(),
            });
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::Internal {
                message: "Sealed key could not be opened".to_string(),
            })
    }
}
