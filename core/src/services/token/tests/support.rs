//! Shared fixtures for token service tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::entities::{BlacklistEntry, RefreshTokenRecord, Subject};
use crate::errors::{DomainError, RejectionReason};
use crate::repositories::{
    InMemoryKeyStore, InMemoryRevocationStore, InMemorySubjectDirectory, RevocationStore,
};
use crate::services::clock::ManualClock;
use crate::services::encryption::KeySealer;
use crate::services::token::{TokenService, TokenServiceConfig, Verification};

pub const SEALING_KEY: [u8; 32] = [7u8; 32];

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn alice() -> Subject {
    Subject::new("alice")
        .with_email("alice@example.com")
        .with_roles(["reader"])
}

/// Revocation store that can be switched off to simulate an outage
#[derive(Clone, Default)]
pub struct FlakyRevocationStore {
    pub inner: InMemoryRevocationStore,
    down: Arc<AtomicBool>,
}

impl FlakyRevocationStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.down.load(Ordering::SeqCst) {
            Err(DomainError::storage("revocation store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RevocationStore for FlakyRevocationStore {
    async fn record_refresh(&self, record: &RefreshTokenRecord) -> Result<(), DomainError> {
        self.check()?;
        self.inner.record_refresh(record).await
    }

    async fn find_refresh(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        self.check()?;
        self.inner.find_refresh(id).await
    }

    async fn revoke_refresh(&self, id: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.check()?;
        self.inner.revoke_refresh(id, now).await
    }

    async fn revoke_all_for_subject(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check()?;
        self.inner.revoke_all_for_subject(subject_id, now).await
    }

    async fn blacklist_access(&self, entry: &BlacklistEntry) -> Result<(), DomainError> {
        self.check()?;
        self.inner.blacklist_access(entry).await
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        self.check()?;
        self.inner.is_blacklisted(jti).await
    }

    async fn delete_expired_refresh(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check()?;
        self.inner.delete_expired_refresh(now).await
    }

    async fn purge_blacklist(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check()?;
        self.inner.purge_blacklist(now).await
    }
}

/// A token service wired to in-memory stores and a manual clock
pub struct Harness {
    pub service: TokenService,
    pub clock: ManualClock,
    pub keys: InMemoryKeyStore,
    pub revocations: FlakyRevocationStore,
    pub subjects: InMemorySubjectDirectory,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(TokenServiceConfig::default()).await
    }

    pub async fn with_config(config: TokenServiceConfig) -> Self {
        let clock = ManualClock::new(t0());
        let keys = InMemoryKeyStore::new();
        let revocations = FlakyRevocationStore::default();
        let subjects = InMemorySubjectDirectory::new();
        subjects.upsert(alice()).await;

        let service = TokenService::new(
            Arc::new(keys.clone()),
            Arc::new(revocations.clone()),
            Arc::new(subjects.clone()),
            KeySealer::new(&SEALING_KEY).unwrap(),
            Arc::new(clock.clone()),
            config,
        );

        Self {
            service,
            clock,
            keys,
            revocations,
            subjects,
        }
    }

    /// Verifies and expects a rejection
    pub async fn rejection(&self, token: &str) -> RejectionReason {
        match self.service.authenticate(token).await.unwrap() {
            Verification::Rejected(reason) => reason,
            Verification::Valid(verified) => {
                panic!("expected rejection, token for {} was accepted", verified.subject.id)
            }
        }
    }
}

pub fn rotating_config() -> TokenServiceConfig {
    TokenServiceConfig {
        rotate_refresh_on_use: true,
        ..TokenServiceConfig::default()
    }
}
