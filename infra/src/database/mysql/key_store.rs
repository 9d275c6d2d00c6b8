//! MySQL implementation of the KeyStore trait.
//!
//! Key pairs live in the `signing_keys` table. Only the sealed form of the
//! private key is ever written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use tracing::debug;

use warden_core::domain::entities::KeyPair;
use warden_core::errors::DomainError;
use warden_core::repositories::KeyStore;

use crate::InfrastructureError;

const SELECT_COLUMNS: &str =
    "SELECT id, public_key_pem, sealed_private_key, created_at, expires_at FROM signing_keys";

/// MySQL implementation of KeyStore
#[derive(Clone)]
pub struct MySqlKeyStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlKeyStore {
    /// Create a new MySQL key store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to KeyPair entity
    fn row_to_key_pair(row: &sqlx::mysql::MySqlRow) -> Result<KeyPair, DomainError> {
        let column = |name: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", name, e),
        };

        Ok(KeyPair {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            public_key_pem: row
                .try_get("public_key_pem")
                .map_err(|e| column("public_key_pem", e))?,
            sealed_private_key: row
                .try_get("sealed_private_key")
                .map_err(|e| column("sealed_private_key", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column("expires_at", e))?,
        })
    }
}

#[async_trait]
impl KeyStore for MySqlKeyStore {
    async fn save(&self, key_pair: &KeyPair) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO signing_keys (
                id, public_key_pem, sealed_private_key, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&key_pair.id)
            .bind(&key_pair.public_key_pem)
            .bind(&key_pair.sealed_private_key)
            .bind(key_pair.created_at)
            .bind(key_pair.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .map_or(false, |db| db.is_unique_violation());
                if duplicate {
                    DomainError::Validation {
                        message: "Key pair already exists".to_string(),
                    }
                } else {
                    InfrastructureError::Database(e).into()
                }
            })?;

        debug!(kid = %key_pair.id, "Stored signing key pair");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<KeyPair>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        row.as_ref().map(Self::row_to_key_pair).transpose()
    }

    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<KeyPair>, DomainError> {
        let query = format!(
            "{} WHERE expires_at > ? ORDER BY expires_at DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        row.as_ref().map(Self::row_to_key_pair).transpose()
    }

    async fn find_all(&self) -> Result<Vec<KeyPair>, DomainError> {
        let query = format!("{} ORDER BY created_at DESC", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        rows.iter().map(Self::row_to_key_pair).collect()
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM signing_keys WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        Ok(result.rows_affected() as usize)
    }
}
