//! Access and refresh token issuance

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{
    AccessClaims, RefreshClaims, RefreshTokenRecord, Subject, ACCESS_TOKEN_TYPE,
    REFRESH_TOKEN_TYPE,
};
use crate::errors::DomainResult;
use crate::repositories::RevocationStore;
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::envelope::{Encrypted, Signed};
use super::key_manager::LoadedKeyPair;

/// An access token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub claims: AccessClaims,
}

/// A refresh token together with its persisted record
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub record: RefreshTokenRecord,
}

/// Builds sign-then-encrypt tokens
pub struct TokenIssuer {
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            revocations,
            clock,
            config,
        }
    }

    /// Issues an access token for `subject` under `pair`
    ///
    /// The claims are signed with the pair's private key, then the signed
    /// token is encrypted to the pair's public key. Nothing is persisted.
    ///
    /// # Arguments
    ///
    /// * `subject` - Current snapshot of the subject
    /// * `pair` - Active key pair
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedAccessToken)` - Compact token and its claims
    /// * `Err(DomainError::Internal)` - A cryptographic primitive failed
    pub fn issue_access(
        &self,
        subject: &Subject,
        pair: &LoadedKeyPair,
    ) -> DomainResult<IssuedAccessToken> {
        let claims = AccessClaims::new(
            subject,
            &self.config.issuer,
            &self.config.audience,
            self.clock.now(),
            self.config.access_token_lifetime,
        );

        let signed = Signed::sign(&claims, ACCESS_TOKEN_TYPE, pair.kid(), pair.encoding_key())?;
        let envelope = Encrypted::seal(&signed, pair.kid(), pair.public_key())?;

        debug!(sub = %claims.sub, kid = %pair.kid(), "Issued access token");

        Ok(IssuedAccessToken {
            token: envelope.to_compact(),
            claims,
        })
    }

    /// Issues a refresh token for `subject` and records it
    ///
    /// The token id is 256 random bits. Writing the record is the last
    /// step, so a failed or cancelled issuance leaves no usable record.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedRefreshToken)` - Compact token and the stored record
    /// * `Err(DomainError)` - Signing failed or the record could not be stored
    pub async fn issue_refresh(
        &self,
        subject: &Subject,
        pair: &LoadedKeyPair,
    ) -> DomainResult<IssuedRefreshToken> {
        let now = self.clock.now();
        let record = RefreshTokenRecord::new(
            generate_token_id(),
            subject.id.clone(),
            now,
            self.config.refresh_token_lifetime,
        );

        let claims = RefreshClaims {
            sub: subject.id.clone(),
            jti: record.id.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: record.created_at.timestamp(),
            exp: record.expires_at.timestamp(),
        };

        let signed = Signed::sign(&claims, REFRESH_TOKEN_TYPE, pair.kid(), pair.encoding_key())?;
        let token = Encrypted::seal(&signed, pair.kid(), pair.public_key())?.to_compact();

        self.revocations.record_refresh(&record).await?;

        debug!(sub = %subject.id, kid = %pair.kid(), "Issued refresh token");

        Ok(IssuedRefreshToken { token, record })
    }
}

fn generate_token_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
