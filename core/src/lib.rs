//! # Warden Core
//!
//! Token lifecycle and signing key rotation engine. This crate contains
//! domain entities, the storage contracts the engine consumes, the engine
//! services and their error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AccessClaims, BlacklistEntry, Jwk, Jwks, KeyPair, RefreshClaims, RefreshStatus,
    RefreshTokenRecord, RefreshedTokens, RevocationOutcome, Subject, TokenPair,
};
pub use errors::{ClaimKind, DomainError, DomainResult, RejectionReason};
pub use repositories::{
    InMemoryKeyStore, InMemoryRevocationStore, InMemorySubjectDirectory, KeyStore,
    RevocationStore, SubjectResolver,
};
pub use services::{
    Clock, KeySealer, ManualClock, SystemClock, TokenCleanupConfig, TokenCleanupService,
    TokenService, TokenServiceConfig, Verification, VerifiedToken,
};
