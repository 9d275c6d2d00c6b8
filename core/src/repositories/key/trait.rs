//! Key store trait defining the interface for signing key pair persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::KeyPair;
use crate::errors::DomainError;

/// Repository trait for [`KeyPair`] persistence
///
/// The store is a plain record keeper. Choosing which pair is active and
/// when a pair may be deleted is the key manager's job.
///
/// # Concurrency
/// Two callers may save distinct pairs at the same moment; implementations
/// must accept both rather than enforce a single active row.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Persist a newly generated key pair
    ///
    /// # Arguments
    /// * `pair` - The key pair to store; `pair.id` must be unique
    ///
    /// # Returns
    /// * `Ok(())` - Pair stored
    /// * `Err(DomainError)` - Storage failure
    async fn save(&self, pair: &KeyPair) -> Result<(), DomainError>;

    /// Find a key pair by its identifier
    ///
    /// # Returns
    /// * `Ok(Some(KeyPair))` - Pair found
    /// * `Ok(None)` - No pair with this `kid`
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_id(&self, id: &str) -> Result<Option<KeyPair>, DomainError>;

    /// Find the pair still active at `now` with the latest expiry
    ///
    /// # Returns
    /// * `Ok(Some(KeyPair))` - A pair with `expires_at > now`
    /// * `Ok(None)` - Every stored pair has left its active window
    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<KeyPair>, DomainError>;

    /// List every stored pair, newest first
    async fn find_all(&self) -> Result<Vec<KeyPair>, DomainError>;

    /// Delete pairs whose active window ended before `cutoff`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of pairs deleted
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
