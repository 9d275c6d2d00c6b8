//! Signing key pair lifecycle: creation, lookup, publication and retirement

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::entities::KeyPair;
use crate::domain::value_objects::{Jwk, Jwks};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyStore;
use crate::services::clock::Clock;
use crate::services::encryption::KeySealer;

use super::config::TokenServiceConfig;

/// A key pair with its material parsed and ready for use
pub struct LoadedKeyPair {
    record: KeyPair,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for LoadedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedKeyPair")
            .field("kid", &self.record.id)
            .field("expires_at", &self.record.expires_at)
            .finish()
    }
}

impl LoadedKeyPair {
    fn from_pem(record: KeyPair, private_pem: &str) -> DomainResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem).map_err(|e| {
            DomainError::Internal {
                message: format!("Invalid private key for {}: {}", record.id, e),
            }
        })?;

        let public_key = RsaPublicKey::from_public_key_pem(&record.public_key_pem).map_err(|e| {
            DomainError::Internal {
                message: format!("Invalid public key for {}: {}", record.id, e),
            }
        })?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
            DomainError::Internal {
                message: format!("Invalid signing key for {}: {}", record.id, e),
            }
        })?;

        let decoding_key =
            DecodingKey::from_rsa_pem(record.public_key_pem.as_bytes()).map_err(|e| {
                DomainError::Internal {
                    message: format!("Invalid verification key for {}: {}", record.id, e),
                }
            })?;

        Ok(Self {
            record,
            private_key,
            public_key,
            encoding_key,
            decoding_key,
        })
    }

    /// Key identifier
    pub fn kid(&self) -> &str {
        &self.record.id
    }

    /// End of the active window
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.record.expires_at
    }

    /// The persisted record (public half and sealed private half)
    pub fn record(&self) -> &KeyPair {
        &self.record
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub(crate) fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Finds or creates the active signing pair and resolves pairs by `kid`
///
/// Creation is not serialized. Two callers that both find no active pair
/// will each generate and store one; both stay valid for verification, so
/// the cost is a wasted key generation and nothing more.
pub struct KeyPairManager {
    store: Arc<dyn KeyStore>,
    sealer: KeySealer,
    clock: Arc<dyn Clock>,
    key_lifetime: Duration,
    retention: Duration,
    rsa_bits: usize,
    cache: RwLock<HashMap<String, Arc<LoadedKeyPair>>>,
}

impl KeyPairManager {
    /// Creates a new key pair manager
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for key pair records
    /// * `sealer` - Protects private keys at rest
    /// * `clock` - Time source for the active window
    /// * `config` - Supplies key lifetime, modulus size and retention
    pub fn new(
        store: Arc<dyn KeyStore>,
        sealer: KeySealer,
        clock: Arc<dyn Clock>,
        config: &TokenServiceConfig,
    ) -> Self {
        Self {
            store,
            sealer,
            clock,
            key_lifetime: config.key_lifetime,
            retention: config.key_retention(),
            rsa_bits: config.rsa_bits,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the pair to sign new tokens with, generating one if needed
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<LoadedKeyPair>)` - A pair whose active window contains now
    /// * `Err(DomainError::KeyGenerationFailed)` - No pair was active and generation failed
    /// * `Err(DomainError)` - Storage failure
    pub async fn get_active_pair(&self) -> DomainResult<Arc<LoadedKeyPair>> {
        let now = self.clock.now();

        if let Some(pair) = self.cached_active(now).await {
            return Ok(pair);
        }

        if let Some(record) = self.store.find_active(now).await? {
            return self.load(record).await;
        }

        self.generate().await
    }

    /// Resolves a pair by key identifier for verification
    ///
    /// Pairs past their active window are still returned; only retirement
    /// removes them.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - Pair found
    /// * `Ok(None)` - No such `kid`; callers must treat this as a failed authentication
    /// * `Err(DomainError)` - Storage failure or an unreadable record
    pub async fn get_pair_by_id(&self, kid: &str) -> DomainResult<Option<Arc<LoadedKeyPair>>> {
        if let Some(pair) = self.cache.read().await.get(kid) {
            return Ok(Some(pair.clone()));
        }

        match self.store.find_by_id(kid).await? {
            Some(record) => self.load(record).await.map(Some),
            None => {
                debug!(kid = %kid, "Key pair not found");
                Ok(None)
            }
        }
    }

    /// Publishes the public half of every stored pair
    pub async fn jwks(&self) -> DomainResult<Jwks> {
        let pairs = self.store.find_all().await?;
        let mut keys = Vec::with_capacity(pairs.len());

        for pair in pairs {
            match RsaPublicKey::from_public_key_pem(&pair.public_key_pem) {
                Ok(public_key) => keys.push(Jwk::rsa(
                    pair.id,
                    URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                    URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
                )),
                Err(e) => warn!(kid = %pair.id, "Skipping unreadable public key: {}", e),
            }
        }

        Ok(Jwks { keys })
    }

    /// Deletes pairs that can no longer have a valid token in circulation
    ///
    /// A pair is retired once its active window ended longer ago than the
    /// longest token lifetime plus clock tolerance.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of pairs deleted
    pub async fn retire_expired(&self) -> DomainResult<usize> {
        let cutoff = self.clock.now() - self.retention;
        let deleted = self.store.delete_expired(cutoff).await?;

        self.cache
            .write()
            .await
            .retain(|_, pair| pair.expires_at() >= cutoff);

        if deleted > 0 {
            info!("Retired {} signing key pairs expired before {}", deleted, cutoff);
        }

        Ok(deleted)
    }

    async fn cached_active(&self, now: DateTime<Utc>) -> Option<Arc<LoadedKeyPair>> {
        self.cache
            .read()
            .await
            .values()
            .filter(|pair| pair.record.is_active_at(now))
            .max_by_key(|pair| pair.expires_at())
            .cloned()
    }

    async fn load(&self, record: KeyPair) -> DomainResult<Arc<LoadedKeyPair>> {
        let private_pem = self.sealer.open(&record.sealed_private_key)?;
        let private_pem = String::from_utf8(private_pem).map_err(|_| DomainError::Internal {
            message: format!("Private key for {} is not valid PEM", record.id),
        })?;

        let pair = Arc::new(LoadedKeyPair::from_pem(record, &private_pem)?);
        self.cache
            .write()
            .await
            .insert(pair.kid().to_string(), pair.clone());

        Ok(pair)
    }

    async fn generate(&self) -> DomainResult<Arc<LoadedKeyPair>> {
        let bits = self.rsa_bits;
        let private_key = tokio::task::spawn_blocking(move || RsaPrivateKey::new(&mut OsRng, bits))
            .await
            .map_err(|e| DomainError::KeyGenerationFailed {
                message: format!("Key generation task failed: {}", e),
            })?
            .map_err(|e| DomainError::KeyGenerationFailed {
                message: e.to_string(),
            })?;

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| DomainError::KeyGenerationFailed {
                message: e.to_string(),
            })?;

        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| DomainError::KeyGenerationFailed {
                message: e.to_string(),
            })?;

        let sealed = self.sealer.seal(private_pem.as_bytes())?;
        let record = KeyPair::new(public_pem, sealed, self.clock.now(), self.key_lifetime);
        let pair = Arc::new(LoadedKeyPair::from_pem(record, &private_pem)?);

        self.store.save(pair.record()).await?;

        info!(
            kid = %pair.kid(),
            expires_at = %pair.expires_at(),
            "Generated new signing key pair"
        );

        self.cache
            .write()
            .await
            .insert(pair.kid().to_string(), pair.clone());

        Ok(pair)
    }
}
