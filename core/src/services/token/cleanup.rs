//! Token cleanup service for periodic maintenance of refresh records, blacklist and key pairs
//!
//! Every step deletes only what has already expired, so a sweep can run
//! alongside live traffic and overlapping sweeps are harmless.

use chrono::Duration;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use warden_shared::CleanupConfig;

use crate::errors::DomainError;
use crate::repositories::RevocationStore;
use crate::services::clock::Clock;

use super::key_manager::KeyPairManager;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Blacklist entries are kept this long past their expiry
    pub blacklist_grace: Duration,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            blacklist_grace: Duration::seconds(60),
            enabled: true,
        }
    }
}

impl TokenCleanupConfig {
    /// Build from the shared cleanup schedule
    ///
    /// # Arguments
    ///
    /// * `settings` - Interval and on/off switch
    /// * `blacklist_grace` - Usually the clock tolerance of the token service
    pub fn from_settings(settings: &CleanupConfig, blacklist_grace: Duration) -> Self {
        Self {
            interval_seconds: settings.interval_seconds,
            blacklist_grace,
            enabled: settings.enabled,
        }
    }
}

/// Service for cleaning up expired revocation state and retired key pairs
pub struct TokenCleanupService {
    revocations: Arc<dyn RevocationStore>,
    keys: Arc<KeyPairManager>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
}

impl TokenCleanupService {
    /// Create a new token cleanup service
    pub fn new(
        revocations: Arc<dyn RevocationStore>,
        keys: Arc<KeyPairManager>,
        clock: Arc<dyn Clock>,
        config: TokenCleanupConfig,
    ) -> Self {
        Self {
            revocations,
            keys,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// This method performs the following cleanup tasks:
    /// 1. Delete expired refresh token records
    /// 2. Purge blacklist entries past expiry plus grace
    /// 3. Retire key pairs no live token can reference
    ///
    /// A failing step is recorded and the remaining steps still run.
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let now = self.clock.now();
        let mut result = CleanupResult::default();

        match self.revocations.delete_expired_refresh(now).await {
            Ok(count) => result.expired_refresh_deleted = count,
            Err(e) => {
                error!("Failed to cleanup expired refresh tokens: {}", e);
                result.errors.push(format!("Refresh cleanup error: {}", e));
            }
        }

        match self
            .revocations
            .purge_blacklist(now - self.config.blacklist_grace)
            .await
        {
            Ok(count) => result.blacklist_entries_deleted = count,
            Err(e) => {
                error!("Failed to cleanup blacklist: {}", e);
                result
                    .errors
                    .push(format!("Blacklist cleanup error: {}", e));
            }
        }

        match self.keys.retire_expired().await {
            Ok(count) => result.key_pairs_retired = count,
            Err(e) => {
                error!("Failed to retire key pairs: {}", e);
                result.errors.push(format!("Key retirement error: {}", e));
            }
        }

        info!(
            "Token cleanup completed - Refresh: {}, Blacklist: {}, Keys: {}",
            result.expired_refresh_deleted,
            result.blacklist_entries_deleted,
            result.key_pairs_retired
        );

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals.
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Token cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh records deleted
    pub expired_refresh_deleted: usize,
    /// Number of expired blacklist entries deleted
    pub blacklist_entries_deleted: usize,
    /// Number of key pairs retired
    pub key_pairs_retired: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.expired_refresh_deleted + self.blacklist_entries_deleted + self.key_pairs_retired
    }
}
