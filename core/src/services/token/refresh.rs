//! Refresh token exchange and logout revocation

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{BlacklistEntry, RefreshedTokens, RevocationOutcome};
use crate::errors::{DomainError, DomainResult, RejectionReason};
use crate::repositories::{RevocationStore, SubjectResolver};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::key_manager::KeyPairManager;
use super::verifier::{TimeCheck, TokenVerifier};

/// Drives refresh and revoke against the revocation store
pub struct RefreshCoordinator {
    keys: Arc<KeyPairManager>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    revocations: Arc<dyn RevocationStore>,
    subjects: Arc<dyn SubjectResolver>,
    clock: Arc<dyn Clock>,
    clock_tolerance: Duration,
    rotate_on_use: bool,
}

impl RefreshCoordinator {
    pub fn new(
        keys: Arc<KeyPairManager>,
        issuer: Arc<TokenIssuer>,
        verifier: Arc<TokenVerifier>,
        revocations: Arc<dyn RevocationStore>,
        subjects: Arc<dyn SubjectResolver>,
        clock: Arc<dyn Clock>,
        config: &TokenServiceConfig,
    ) -> Self {
        Self {
            keys,
            issuer,
            verifier,
            revocations,
            subjects,
            clock,
            clock_tolerance: config.clock_tolerance,
            rotate_on_use: config.rotate_refresh_on_use,
        }
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The subject is re-resolved so the new token carries current
    /// attributes, and the current active pair signs it. With rotation on
    /// use the old refresh token is revoked and a new one returned; when two
    /// requests race on the same token only the one that wins the revoke
    /// proceeds.
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshedTokens)` - New access token, plus a new refresh token when rotating
    /// * `Err(DomainError::Rejected(ExpiredOrRevoked))` - Record missing, revoked or expired
    /// * `Err(DomainError::Rejected(SubjectNotFound))` - Subject is gone; the record was revoked
    /// * `Err(DomainError::Rejected(_))` - The token itself failed verification
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<RefreshedTokens> {
        let claims = self
            .verifier
            .decode_refresh(refresh_token, TimeCheck::Enforce)
            .await?;
        let now = self.clock.now();

        let record = match self.revocations.find_refresh(&claims.jti).await? {
            Some(record) if record.is_usable_at(now) && record.subject_id == claims.sub => record,
            _ => {
                debug!("Refresh rejected: record missing, revoked or expired");
                return Err(RejectionReason::ExpiredOrRevoked.into());
            }
        };

        let subject = match self.subjects.find_subject(&record.subject_id).await? {
            Some(subject) => subject,
            None => {
                self.revocations.revoke_refresh(&record.id, now).await?;
                warn!(sub = %record.subject_id, "Subject vanished; refresh token revoked");
                return Err(RejectionReason::SubjectNotFound.into());
            }
        };

        let pair = self.keys.get_active_pair().await?;
        let access = self.issuer.issue_access(&subject, &pair)?;

        let refresh_token = if self.rotate_on_use {
            if !self.revocations.revoke_refresh(&record.id, now).await? {
                debug!("Refresh rejected: token was consumed concurrently");
                return Err(RejectionReason::ExpiredOrRevoked.into());
            }
            let issued = self.issuer.issue_refresh(&subject, &pair).await?;
            Some(issued.token)
        } else {
            None
        };

        Ok(RefreshedTokens {
            access_token: access.token,
            access_expires_at: access.claims.expires_at(),
            refresh_token,
        })
    }

    /// Revokes a refresh token and, if given, blacklists an access token
    ///
    /// The refresh token is accepted even past its expiry so a late logout
    /// still succeeds. The access token's `jti` is blacklisted until the
    /// token's own `exp`; stores keep the entry for the clock tolerance
    /// beyond that. A token that no longer verifies needs no entry, and one
    /// that fails to decode is logged and ignored. An access token is only
    /// blacklisted when it belongs to the refresh token's subject.
    ///
    /// # Returns
    ///
    /// * `Ok(RevocationOutcome)` - Which of the two writes changed state
    /// * `Err(DomainError::Rejected(_))` - The refresh token is not one of ours
    /// * `Err(DomainError)` - Storage failure; nothing may be assumed revoked
    pub async fn revoke(
        &self,
        refresh_token: &str,
        access_token: Option<&str>,
    ) -> DomainResult<RevocationOutcome> {
        let claims = self
            .verifier
            .decode_refresh(refresh_token, TimeCheck::Skip)
            .await?;
        let now = self.clock.now();

        let refresh_revoked = self.revocations.revoke_refresh(&claims.jti, now).await?;
        let mut outcome = RevocationOutcome {
            refresh_revoked,
            access_blacklisted: false,
        };

        if let Some(access_token) = access_token {
            match self.verifier.decode_access(access_token).await {
                Ok((access, _)) if access.sub != claims.sub => {
                    warn!(
                        sub = %claims.sub,
                        "Access token presented at logout belongs to another subject; not blacklisted"
                    );
                }
                Ok((access, _)) => {
                    let expires_at = access.expires_at();
                    if expires_at + self.clock_tolerance > now {
                        let jti = access.jti.unwrap_or_default();
                        self.revocations
                            .blacklist_access(&BlacklistEntry::new(jti, expires_at))
                            .await?;
                        outcome.access_blacklisted = true;
                    }
                }
                Err(DomainError::Rejected(reason)) => {
                    warn!(
                        reason = reason.code(),
                        "Access token presented at logout not blacklisted: {}", reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            sub = %claims.sub,
            refresh_revoked = outcome.refresh_revoked,
            access_blacklisted = outcome.access_blacklisted,
            "Session revoked"
        );

        Ok(outcome)
    }
}
