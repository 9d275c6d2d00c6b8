//! In-memory implementation of KeyStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::KeyPair;
use crate::errors::DomainError;

use super::r#trait::KeyStore;

/// Key store backed by a process-local map
#[derive(Clone, Default)]
pub struct InMemoryKeyStore {
    pairs: Arc<RwLock<HashMap<String, KeyPair>>>,
}

impl InMemoryKeyStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs
    pub async fn len(&self) -> usize {
        self.pairs.read().await.len()
    }

    /// True if no pair is stored
    pub async fn is_empty(&self) -> bool {
        self.pairs.read().await.is_empty()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn save(&self, pair: &KeyPair) -> Result<(), DomainError> {
        let mut pairs = self.pairs.write().await;

        if pairs.contains_key(&pair.id) {
            return Err(DomainError::Validation {
                message: format!("Key pair {} already exists", pair.id),
            });
        }

        pairs.insert(pair.id.clone(), pair.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<KeyPair>, DomainError> {
        let pairs = self.pairs.read().await;
        Ok(pairs.get(id).cloned())
    }

    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<KeyPair>, DomainError> {
        let pairs = self.pairs.read().await;
        Ok(pairs
            .values()
            .filter(|p| p.is_active_at(now))
            .max_by_key(|p| p.expires_at)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<KeyPair>, DomainError> {
        let pairs = self.pairs.read().await;
        let mut all: Vec<KeyPair> = pairs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut pairs = self.pairs.write().await;
        let initial_count = pairs.len();

        pairs.retain(|_, pair| pair.expires_at >= cutoff);

        Ok(initial_count - pairs.len())
    }
}
