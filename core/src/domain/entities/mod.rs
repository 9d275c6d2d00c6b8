//! Domain entities representing persisted and in-flight token state.

pub mod key_pair;
pub mod subject;
pub mod token;


pub use key_pair::KeyPair;
pub use subject::Subject;
pub use token::{
    AccessClaims, BlacklistEntry, RefreshClaims, RefreshStatus, RefreshTokenRecord,
    RefreshedTokens, RevocationOutcome, TokenPair, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE,
};
