//! Rejection taxonomy for token verification
//!
//! These variants are produced by the verifier's own checks rather than
//! mirrored from any cryptographic library, so the set stays stable when the
//! backend changes. The specific reason is for logs only; callers present
//! every rejection as the same generic authentication failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which claim failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// `iss` did not match the configured issuer
    Issuer,
    /// `aud` did not match the configured audience
    Audience,
    /// Envelope or signature algorithm was not the expected one
    Algorithm,
    /// `iat` lies in the future beyond the clock tolerance
    IssuedAt,
    /// Token is older than the configured maximum age
    MaxAge,
    /// Inner `typ` header does not match the expected token kind
    TokenType,
    /// Inner `kid` differs from the envelope `kid`
    KeyId,
}

impl std::fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClaimKind::Issuer => "iss",
            ClaimKind::Audience => "aud",
            ClaimKind::Algorithm => "alg",
            ClaimKind::IssuedAt => "iat",
            ClaimKind::MaxAge => "max_age",
            ClaimKind::TokenType => "typ",
            ClaimKind::KeyId => "kid",
        };
        f.write_str(name)
    }
}

/// Terminal reason a token was not accepted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Unknown signing key")]
    UnknownKey,

    #[error("Token decryption failed")]
    DecryptionFailed,

    #[error("Token signature verification failed")]
    SignatureInvalid,

    #[error("Invalid token claim: {claim}")]
    ClaimInvalid { claim: ClaimKind },

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Subject not found")]
    SubjectNotFound,

    #[error("Refresh token expired or revoked")]
    ExpiredOrRevoked,
}

impl RejectionReason {
    /// Stable code for structured logs
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MalformedToken => "malformed",
            RejectionReason::UnknownKey => "unknown_key",
            RejectionReason::DecryptionFailed => "decryption_failed",
            RejectionReason::SignatureInvalid => "signature_invalid",
            RejectionReason::ClaimInvalid { .. } => "claim_invalid",
            RejectionReason::TokenExpired => "expired",
            RejectionReason::TokenRevoked => "revoked",
            RejectionReason::SubjectNotFound => "subject_not_found",
            RejectionReason::ExpiredOrRevoked => "expired_or_revoked",
        }
    }

    /// Shorthand for a claim failure
    pub fn claim(claim: ClaimKind) -> Self {
        RejectionReason::ClaimInvalid { claim }
    }
}
