//! In-memory implementation of RevocationStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{BlacklistEntry, RefreshTokenRecord};
use crate::errors::DomainError;

use super::r#trait::RevocationStore;

/// Revocation store backed by process-local maps
#[derive(Clone, Default)]
pub struct InMemoryRevocationStore {
    refresh: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
    blacklist: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh records held, in any status
    pub async fn refresh_count(&self) -> usize {
        self.refresh.read().await.len()
    }

    /// Number of blacklist entries held
    pub async fn blacklist_count(&self) -> usize {
        self.blacklist.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn record_refresh(&self, record: &RefreshTokenRecord) -> Result<(), DomainError> {
        let mut refresh = self.refresh.write().await;

        if refresh.contains_key(&record.id) {
            return Err(DomainError::Validation {
                message: "Refresh token already exists".to_string(),
            });
        }

        refresh.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let refresh = self.refresh.read().await;
        Ok(refresh.get(id).cloned())
    }

    async fn revoke_refresh(&self, id: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut refresh = self.refresh.write().await;

        match refresh.get_mut(id) {
            Some(record) => Ok(record.revoke(now)),
            None => Ok(false),
        }
    }

    async fn revoke_all_for_subject(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut refresh = self.refresh.write().await;

        let mut count = 0;

        for record in refresh.values_mut() {
            if record.subject_id == subject_id && record.revoke(now) {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn blacklist_access(&self, entry: &BlacklistEntry) -> Result<(), DomainError> {
        let mut blacklist = self.blacklist.write().await;
        blacklist.insert(entry.jti.clone(), entry.expires_at);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        let blacklist = self.blacklist.read().await;
        Ok(blacklist.contains_key(jti))
    }

    async fn delete_expired_refresh(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut refresh = self.refresh.write().await;
        let initial_count = refresh.len();

        refresh.retain(|_, record| !record.is_expired_at(now));

        Ok(initial_count - refresh.len())
    }

    async fn purge_blacklist(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut blacklist = self.blacklist.write().await;
        let initial_count = blacklist.len();

        blacklist.retain(|_, expires_at| *expires_at > now);

        Ok(initial_count - blacklist.len())
    }
}
