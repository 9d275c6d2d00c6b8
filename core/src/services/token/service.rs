//! Token service facade

use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{RefreshedTokens, RevocationOutcome, TokenPair};
use crate::domain::value_objects::Jwks;
use crate::errors::{DomainResult, RejectionReason};
use crate::repositories::{KeyStore, RevocationStore, SubjectResolver};
use crate::services::clock::Clock;
use crate::services::encryption::KeySealer;

use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::key_manager::KeyPairManager;
use super::refresh::RefreshCoordinator;
use super::verifier::{TokenVerifier, Verification};

/// Entry point for issuing, verifying, refreshing and revoking tokens
pub struct TokenService {
    keys: Arc<KeyPairManager>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    coordinator: RefreshCoordinator,
    revocations: Arc<dyn RevocationStore>,
    subjects: Arc<dyn SubjectResolver>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `key_store` - Persistence for signing key pairs
    /// * `revocations` - Refresh records and access token blacklist
    /// * `subjects` - Identity resolver
    /// * `sealer` - Protects private keys at rest
    /// * `clock` - Time source
    /// * `config` - Token service configuration
    pub fn new(
        key_store: Arc<dyn KeyStore>,
        revocations: Arc<dyn RevocationStore>,
        subjects: Arc<dyn SubjectResolver>,
        sealer: KeySealer,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        let keys = Arc::new(KeyPairManager::new(
            key_store,
            sealer,
            clock.clone(),
            &config,
        ));
        let issuer = Arc::new(TokenIssuer::new(
            revocations.clone(),
            clock.clone(),
            config.clone(),
        ));
        let verifier = Arc::new(TokenVerifier::new(
            keys.clone(),
            revocations.clone(),
            subjects.clone(),
            clock.clone(),
            config.clone(),
        ));
        let coordinator = RefreshCoordinator::new(
            keys.clone(),
            issuer.clone(),
            verifier.clone(),
            revocations.clone(),
            subjects.clone(),
            clock.clone(),
            &config,
        );

        Self {
            keys,
            issuer,
            verifier,
            coordinator,
            revocations,
            subjects,
            clock,
            config,
        }
    }

    /// Issues an access and refresh token pair to an already authenticated subject
    ///
    /// The credential check happens before this call; here the subject is
    /// only resolved to pick up its current attributes.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The generated token pair
    /// * `Err(DomainError::Rejected(SubjectNotFound))` - Unknown subject
    /// * `Err(DomainError)` - Key generation or storage failure
    pub async fn authorize(&self, subject_id: &str) -> DomainResult<TokenPair> {
        let subject = self
            .subjects
            .find_subject(subject_id)
            .await?
            .ok_or(RejectionReason::SubjectNotFound)?;

        let pair = self.keys.get_active_pair().await?;
        let access = self.issuer.issue_access(&subject, &pair)?;
        let refresh = self.issuer.issue_refresh(&subject, &pair).await?;

        info!(sub = %subject.id, kid = %pair.kid(), "Authorized subject");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.claims.expires_at(),
            refresh_expires_at: refresh.record.expires_at,
        })
    }

    /// Verifies an access token
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<Verification> {
        self.verifier.verify(access_token).await
    }

    /// Exchanges a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<RefreshedTokens> {
        self.coordinator.refresh(refresh_token).await
    }

    /// Revokes a refresh token and optionally blacklists an access token
    pub async fn revoke(
        &self,
        refresh_token: &str,
        access_token: Option<&str>,
    ) -> DomainResult<RevocationOutcome> {
        self.coordinator.revoke(refresh_token, access_token).await
    }

    /// Public keys for external verifiers
    pub async fn public_key_set(&self) -> DomainResult<Jwks> {
        self.keys.jwks().await
    }

    /// Revokes every refresh token of a subject
    ///
    /// Access tokens already issued stay valid until they expire.
    pub async fn revoke_all_for_subject(&self, subject_id: &str) -> DomainResult<usize> {
        let count = self
            .revocations
            .revoke_all_for_subject(subject_id, self.clock.now())
            .await?;

        info!(sub = %subject_id, "Revoked {} refresh tokens", count);
        Ok(count)
    }

    /// Key pair manager, shared with the cleanup task
    pub fn key_manager(&self) -> Arc<KeyPairManager> {
        self.keys.clone()
    }

    /// Revocation store, shared with the cleanup task
    pub fn revocation_store(&self) -> Arc<dyn RevocationStore> {
        self.revocations.clone()
    }

    /// Time source in use
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}
