//! Revocation store trait covering refresh records and the access token blacklist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{BlacklistEntry, RefreshTokenRecord};
use crate::errors::DomainError;

/// Repository trait for refresh token status and access token revocation
///
/// Refresh revocation and access blacklisting are independent: revoking a
/// refresh record never touches access tokens already issued from it.
///
/// Every write must be durable before the returned future resolves, so a
/// revoke acknowledged to a client is visible to the next request.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Persist the record backing a newly issued refresh token
    ///
    /// # Arguments
    /// * `record` - Active record; `record.id` must be unique
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(DomainError)` - Storage failure or duplicate id
    async fn record_refresh(&self, record: &RefreshTokenRecord) -> Result<(), DomainError>;

    /// Find a refresh record by token id
    ///
    /// # Returns
    /// * `Ok(Some(RefreshTokenRecord))` - Record found, in any status
    /// * `Ok(None)` - Unknown id
    async fn find_refresh(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Revoke a refresh record
    ///
    /// Revoking a missing or already revoked record is not an error. When
    /// several callers race on the same id exactly one observes `true`.
    ///
    /// # Returns
    /// * `Ok(true)` - The record went from active to revoked
    /// * `Ok(false)` - Nothing changed
    async fn revoke_refresh(&self, id: &str, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Revoke every active refresh record of a subject
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn revoke_all_for_subject(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Blacklist an access token id until its natural expiry
    async fn blacklist_access(&self, entry: &BlacklistEntry) -> Result<(), DomainError>;

    /// Check whether an access token id is blacklisted
    ///
    /// Once an entry's expiry has passed it may report either answer; the
    /// token itself no longer validates by then.
    async fn is_blacklisted(&self, jti: &str) -> Result<bool, DomainError>;

    /// Delete refresh records that expired before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn delete_expired_refresh(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Delete blacklist entries that expired before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries deleted
    async fn purge_blacklist(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
