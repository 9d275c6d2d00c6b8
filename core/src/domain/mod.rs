//! Domain layer containing entities and value objects.

pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{
    AccessClaims, BlacklistEntry, KeyPair, RefreshClaims, RefreshStatus, RefreshTokenRecord,
    RefreshedTokens, RevocationOutcome, Subject, TokenPair, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE,
};
pub use value_objects::{Jwk, Jwks};
