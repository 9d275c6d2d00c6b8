//! Access token verification
//!
//! A call runs a fixed sequence of checks and ends in either
//! [`Verification::Valid`] or [`Verification::Rejected`]:
//!
//! 1. read `kid` from the envelope header
//! 2. resolve the key pair
//! 3. decrypt
//! 4. verify the signature and the standard claims
//! 5. require a `jti`
//! 6. consult the blacklist
//! 7. resolve the subject
//!
//! Storage failures along the way are returned as errors, never as
//! rejections, so an outage is not mistaken for a bad credential.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{
    AccessClaims, RefreshClaims, Subject, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE,
};
use crate::errors::{ClaimKind, DomainError, DomainResult, RejectionReason};
use crate::repositories::{RevocationStore, SubjectResolver};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::envelope::{Encrypted, Signed};
use super::key_manager::KeyPairManager;

/// Outcome of verifying an access token
#[derive(Debug, Clone)]
pub enum Verification {
    Valid(VerifiedToken),
    Rejected(RejectionReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }

    /// The rejection reason, if any
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Verification::Valid(_) => None,
            Verification::Rejected(reason) => Some(*reason),
        }
    }

    /// Converts into a `Result`, treating rejection as an error
    pub fn into_result(self) -> DomainResult<VerifiedToken> {
        match self {
            Verification::Valid(token) => Ok(token),
            Verification::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// A verified access token and the live subject behind it
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub subject: Subject,
    pub claims: AccessClaims,
    pub kid: String,
}

impl VerifiedToken {
    /// The token's `jti`; always present on a verified token
    pub fn jti(&self) -> &str {
        self.claims.jti.as_deref().unwrap_or_default()
    }
}

/// Whether time-based claims are enforced while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeCheck {
    Enforce,
    /// Skip `iat`/`exp`/age checks; used when revoking a refresh token
    Skip,
}

/// Decrypts, verifies and validates tokens against the key pair manager
pub struct TokenVerifier {
    keys: Arc<KeyPairManager>,
    revocations: Arc<dyn RevocationStore>,
    subjects: Arc<dyn SubjectResolver>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<KeyPairManager>,
        revocations: Arc<dyn RevocationStore>,
        subjects: Arc<dyn SubjectResolver>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            keys,
            revocations,
            subjects,
            clock,
            config,
        }
    }

    /// Verifies an access token end to end
    ///
    /// # Returns
    ///
    /// * `Ok(Verification::Valid)` - Token authentic, current and not revoked; subject is live
    /// * `Ok(Verification::Rejected)` - Token must be treated as unauthenticated
    /// * `Err(DomainError)` - Infrastructure failure; no authentication decision was made
    pub async fn verify(&self, token: &str) -> DomainResult<Verification> {
        match self.verify_inner(token).await {
            Ok(verified) => Ok(Verification::Valid(verified)),
            Err(DomainError::Rejected(reason)) => {
                debug!(reason = reason.code(), "Access token rejected: {}", reason);
                Ok(Verification::Rejected(reason))
            }
            Err(e) => {
                warn!("Access token verification failed: {}", e);
                Err(e)
            }
        }
    }

    async fn verify_inner(&self, token: &str) -> DomainResult<VerifiedToken> {
        let (claims, kid) = self.decode_access(token).await?;
        let jti = claims.jti.as_deref().unwrap_or_default();

        if self.revocations.is_blacklisted(jti).await? {
            return Err(RejectionReason::TokenRevoked.into());
        }

        let subject = self
            .subjects
            .find_subject(&claims.sub)
            .await?
            .ok_or(RejectionReason::SubjectNotFound)?;

        Ok(VerifiedToken {
            subject,
            claims,
            kid,
        })
    }

    /// Decrypts and validates an access token without consulting revocation state
    ///
    /// Runs steps 1 to 5. Rejections come back as [`DomainError::Rejected`].
    pub(crate) async fn decode_access(&self, token: &str) -> DomainResult<(AccessClaims, String)> {
        let (claims, kid) = self
            .open_and_verify::<AccessClaims>(token, ACCESS_TOKEN_TYPE)
            .await?;

        self.check_audience(&claims.iss, &claims.aud)?;
        self.check_times(
            claims.iat,
            claims.exp,
            self.config.max_token_age,
            self.clock.now(),
        )?;

        match claims.jti.as_deref() {
            Some(jti) if !jti.is_empty() => Ok((claims, kid)),
            _ => Err(RejectionReason::MalformedToken.into()),
        }
    }

    /// Decrypts and validates a refresh token envelope
    ///
    /// The record behind it is not looked up here.
    pub(crate) async fn decode_refresh(
        &self,
        token: &str,
        time_check: TimeCheck,
    ) -> DomainResult<RefreshClaims> {
        let (claims, _) = self
            .open_and_verify::<RefreshClaims>(token, REFRESH_TOKEN_TYPE)
            .await?;

        self.check_audience(&claims.iss, &claims.aud)?;
        if time_check == TimeCheck::Enforce {
            self.check_times(
                claims.iat,
                claims.exp,
                self.config.refresh_token_lifetime,
                self.clock.now(),
            )?;
        }

        if claims.jti.is_empty() {
            return Err(RejectionReason::MalformedToken.into());
        }

        Ok(claims)
    }

    async fn open_and_verify<C>(&self, token: &str, typ: &str) -> DomainResult<(C, String)>
    where
        C: Serialize + DeserializeOwned,
    {
        let envelope = Encrypted::<Signed<C>>::parse(token)?;
        let kid = envelope.kid().to_string();

        let pair = self
            .keys
            .get_pair_by_id(&kid)
            .await?
            .ok_or(RejectionReason::UnknownKey)?;

        let signed = envelope.open(pair.private_key())?;
        let claims = signed.verify(pair.decoding_key(), typ, &kid)?;

        Ok((claims, kid))
    }

    fn check_audience(&self, iss: &str, aud: &str) -> Result<(), RejectionReason> {
        if iss != self.config.issuer {
            return Err(RejectionReason::claim(ClaimKind::Issuer));
        }
        if aud != self.config.audience {
            return Err(RejectionReason::claim(ClaimKind::Audience));
        }
        Ok(())
    }

    /// `now` must lie in `[iat - tol, exp + tol)` and the token must not be
    /// older than `max_age + tol`.
    fn check_times(
        &self,
        iat: i64,
        exp: i64,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), RejectionReason> {
        let now = now.timestamp();
        let tolerance = self.config.clock_tolerance.num_seconds();

        if now < iat.saturating_sub(tolerance) {
            return Err(RejectionReason::claim(ClaimKind::IssuedAt));
        }
        if now >= exp.saturating_add(tolerance) {
            return Err(RejectionReason::TokenExpired);
        }
        if now.saturating_sub(iat) > max_age.num_seconds().saturating_add(tolerance) {
            return Err(RejectionReason::claim(ClaimKind::MaxAge));
        }
        Ok(())
    }
}
