//! Protection of private key material at rest

pub mod key_sealer;


pub use key_sealer::KeySealer;
