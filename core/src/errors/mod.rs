//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{ClaimKind, RejectionReason};

use thiserror::Error;

/// Core domain errors
///
/// Authentication failures travel as [`DomainError::Rejected`]; every other
/// variant is an infrastructure or programming failure that callers surface
/// as a server error rather than an invalid credential.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    #[error("Key generation failed: {message}")]
    KeyGenerationFailed { message: String },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Returns the rejection reason if this error is an authentication failure
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            DomainError::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    /// True for failures of the backing infrastructure (storage, key generation)
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DomainError::KeyGenerationFailed { .. } | DomainError::StorageUnavailable { .. }
        )
    }

    /// Shorthand for a storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::StorageUnavailable {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
