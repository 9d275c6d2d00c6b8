//! Redis implementation of the RevocationStore trait.
//!
//! Key layout, all under the configured prefix:
//!
//! | Key                          | Value                      | Expiry                  |
//! |------------------------------|----------------------------|-------------------------|
//! | `refresh:{id}`               | JSON `RefreshTokenRecord`  | record expiry           |
//! | `refresh:{id}:revoked`       | revocation time (RFC 3339) | record expiry           |
//! | `subject:{sub}:refresh`      | sorted set of refresh ids, scored by expiry | longest member's expiry |
//! | `blacklist:{jti}`            | token expiry (RFC 3339)    | token expiry + grace    |
//!
//! The stored record is never rewritten. Revocation is the creation of the
//! `:revoked` marker with `SET NX`, which makes it a single atomic
//! compare-and-set across every server sharing the Redis instance.
//!
//! The per-subject index only holds ids that are still usable: revoked ids
//! are removed as they are revoked, and ids past their expiry are pruned
//! whenever the index is written or walked.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use warden_core::domain::entities::{BlacklistEntry, RefreshStatus, RefreshTokenRecord};
use warden_core::errors::DomainError;
use warden_core::repositories::RevocationStore;

use crate::config::CacheConfig;

use super::redis_client::RedisClient;

/// Builds the Redis keys used by the revocation store
#[derive(Debug, Clone)]
pub struct RevocationKeys {
    config: CacheConfig,
}

impl RevocationKeys {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn refresh(&self, id: &str) -> String {
        self.config.make_key(&format!("refresh:{}", id))
    }

    pub fn revoked(&self, id: &str) -> String {
        self.config.make_key(&format!("refresh:{}:revoked", id))
    }

    pub fn subject(&self, subject_id: &str) -> String {
        self.config.make_key(&format!("subject:{}:refresh", subject_id))
    }

    pub fn blacklist(&self, jti: &str) -> String {
        self.config.make_key(&format!("blacklist:{}", jti))
    }
}

/// Seconds from `now` until `expires_at`, never less than one
///
/// Redis rejects a zero expiry, and a key that is already due must still
/// be written so a racing reader sees it until Redis drops it.
pub(crate) fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining = (expires_at - now).num_seconds();
    remaining.max(1) as u64
}

/// Sorted-set score of a refresh id in the subject index
///
/// Members scored at or below the current timestamp are expired, matching
/// `RefreshTokenRecord::is_expired_at`.
pub(crate) fn index_score(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// Revocation store shared by every server instance through Redis
///
/// Expired state is removed by Redis itself, so the cleanup hooks report
/// zero deletions.
#[derive(Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
    keys: RevocationKeys,
    blacklist_grace: Duration,
}

impl RedisRevocationStore {
    /// Create a new Redis revocation store
    ///
    /// # Arguments
    /// * `client` - Connected Redis client
    /// * `blacklist_grace` - How long a blacklist entry outlives its token; set to the verifier's clock tolerance
    pub fn new(client: RedisClient, blacklist_grace: Duration) -> Self {
        let keys = RevocationKeys::new(client.config().clone());
        Self {
            client,
            keys,
            blacklist_grace,
        }
    }

    fn encode(record: &RefreshTokenRecord) -> Result<String, DomainError> {
        serde_json::to_string(record).map_err(|e| crate::InfrastructureError::from(e).into())
    }

    fn decode(raw: &str) -> Result<RefreshTokenRecord, DomainError> {
        serde_json::from_str(raw).map_err(|e| crate::InfrastructureError::from(e).into())
    }
}

/// Folds the revocation marker into the stored record
pub(crate) fn apply_marker(
    mut record: RefreshTokenRecord,
    marker: Option<&str>,
) -> RefreshTokenRecord {
    if let Some(marker) = marker {
        record.status = RefreshStatus::Revoked;
        record.revoked_at = DateTime::parse_from_rfc3339(marker)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    record
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn record_refresh(&self, record: &RefreshTokenRecord) -> Result<(), DomainError> {
        let ttl = ttl_seconds(record.expires_at, Utc::now());
        let created = self
            .client
            .set_if_absent(&self.keys.refresh(&record.id), &Self::encode(record)?, ttl)
            .await?;

        if !created {
            return Err(DomainError::Validation {
                message: "Refresh token already exists".to_string(),
            });
        }

        self.client
            .add_to_sorted_set(
                &self.keys.subject(&record.subject_id),
                &record.id,
                index_score(record.expires_at),
                index_score(Utc::now()),
                ttl,
            )
            .await?;

        Ok(())
    }

    async fn find_refresh(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let Some(raw) = self.client.get(&self.keys.refresh(id)).await? else {
            return Ok(None);
        };
        let marker = self.client.get(&self.keys.revoked(id)).await?;

        Ok(Some(apply_marker(Self::decode(&raw)?, marker.as_deref())))
    }

    async fn revoke_refresh(&self, id: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let Some(raw) = self.client.get(&self.keys.refresh(id)).await? else {
            return Ok(false);
        };
        let record = Self::decode(&raw)?;

        let revoked = self
            .client
            .set_if_absent(
                &self.keys.revoked(id),
                &now.to_rfc3339(),
                ttl_seconds(record.expires_at, now),
            )
            .await?;

        if revoked {
            self.client
                .remove_from_sorted_set(&self.keys.subject(&record.subject_id), id)
                .await?;
        }

        debug!(revoked, "Refresh token revocation attempted");
        Ok(revoked)
    }

    async fn revoke_all_for_subject(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let index_key = self.keys.subject(subject_id);
        let mut count = 0;

        for id in self
            .client
            .prune_sorted_set(&index_key, index_score(now))
            .await?
        {
            if self.revoke_refresh(&id, now).await? {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn blacklist_access(&self, entry: &BlacklistEntry) -> Result<(), DomainError> {
        let ttl = ttl_seconds(entry.expires_at + self.blacklist_grace, Utc::now());

        self.client
            .set_with_expiry(
                &self.keys.blacklist(&entry.jti),
                &entry.expires_at.to_rfc3339(),
                ttl,
            )
            .await?;

        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.keys.blacklist(jti)).await?)
    }

    async fn delete_expired_refresh(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        debug!("Refresh records expire through Redis TTLs");
        Ok(0)
    }

    async fn purge_blacklist(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        debug!("Blacklist entries expire through Redis TTLs");
        Ok(0)
    }
}
