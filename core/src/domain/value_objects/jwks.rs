//! Published public key set

use serde::{Deserialize, Serialize};

/// JSON Web Key Set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    /// The keys in this set
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Finds a key by its identifier
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

/// Public half of an RSA key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always "RSA"
    pub kty: String,

    /// Key ID
    pub kid: String,

    /// Key use
    #[serde(rename = "use")]
    pub use_: String,

    /// Algorithm the key is used with
    pub alg: String,

    /// RSA modulus (base64url encoded)
    pub n: String,

    /// RSA exponent (base64url encoded)
    pub e: String,
}

impl Jwk {
    /// Creates an RSA key entry for the envelope's key wrapping algorithm
    pub fn rsa(kid: impl Into<String>, n: String, e: String) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid: kid.into(),
            use_: "enc".to_string(),
            alg: "RSA-OAEP-256".to_string(),
            n,
            e,
        }
    }
}
