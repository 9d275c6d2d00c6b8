//! Token service module
//!
//! This module handles all token-related operations including:
//! - Signing key pair rotation and publication
//! - Sign-then-encrypt access and refresh token issuance
//! - Access token verification
//! - Refresh token exchange and revocation
//! - Background cleanup of expired state

mod cleanup;
mod config;
mod envelope;
mod issuer;
mod key_manager;
mod refresh;
mod service;
mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use envelope::{Encrypted, EnvelopeHeader, Signed, CONTENT_ENCRYPTION, KEY_WRAP_ALGORITHM};
pub use issuer::{IssuedAccessToken, IssuedRefreshToken, TokenIssuer};
pub use key_manager::{KeyPairManager, LoadedKeyPair};
pub use refresh::RefreshCoordinator;
pub use service::TokenService;
pub use verifier::{TimeCheck, TokenVerifier, Verification, VerifiedToken};
