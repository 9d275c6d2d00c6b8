//! MySQL implementations of the core storage contracts

pub mod key_store;
pub mod subject_resolver;

pub use key_store::MySqlKeyStore;
pub use subject_resolver::MySqlSubjectResolver;
