//! Storage contracts consumed by the token engine, with in-memory implementations.

pub mod key;
pub mod revocation;
pub mod subject;

pub use key::{InMemoryKeyStore, KeyStore};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use subject::{InMemorySubjectDirectory, SubjectResolver};
