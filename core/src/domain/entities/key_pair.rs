//! Signing key pair record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted RSA key pair
///
/// The private half is stored sealed; only the key manager can open it.
/// `expires_at` ends the pair's time as the active issuing key, not its
/// usefulness for verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// Key identifier, published as `kid`
    pub id: String,

    /// SPKI PEM of the public key
    pub public_key_pem: String,

    /// PKCS#8 PEM of the private key, sealed with AES-256-GCM
    pub sealed_private_key: String,

    /// When the pair was generated
    pub created_at: DateTime<Utc>,

    /// When the pair stops being handed out for new tokens
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl KeyPair {
    /// Creates a new key pair record with a fresh identifier
    ///
    /// # Arguments
    ///
    /// * `public_key_pem` - SPKI PEM of the public key
    /// * `sealed_private_key` - Sealed PKCS#8 PEM of the private key
    /// * `created_at` - Creation time
    /// * `lifetime` - How long the pair stays active for issuance
    pub fn new(
        public_key_pem: String,
        sealed_private_key: String,
        created_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            public_key_pem,
            sealed_private_key,
            created_at,
            expires_at: created_at + lifetime,
        }
    }

    /// True while the pair may be used to issue new tokens
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
