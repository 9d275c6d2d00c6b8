//! Services containing the token engine and its supporting pieces.

pub mod clock;
pub mod encryption;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use encryption::KeySealer;
pub use token::{
    TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig, Verification,
    VerifiedToken,
};
