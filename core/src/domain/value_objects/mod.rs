//! Value objects representing immutable domain concepts.

pub mod jwks;

pub use jwks::{Jwk, Jwks};
