//! Two-layer token envelope: an RS256 JWS sealed inside a compact JWE.
//!
//! Verification order is fixed by the types: an [`Encrypted`] envelope can
//! only be opened into a [`Signed`] value, and only a verified [`Signed`]
//! value yields claims.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::marker::PhantomData;

use crate::errors::{ClaimKind, DomainError, DomainResult, RejectionReason};

/// Key management algorithm of the outer layer
pub const KEY_WRAP_ALGORITHM: &str = "RSA-OAEP-256";

/// Content encryption algorithm of the outer layer
pub const CONTENT_ENCRYPTION: &str = "A256GCM";

const CEK_LEN: usize = 32;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Unencrypted protected header of the outer layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub alg: String,
    pub enc: String,
    pub kid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

/// Signed inner layer carrying claims of type `C`
#[derive(Debug, Clone)]
pub struct Signed<C> {
    compact: String,
    _claims: PhantomData<C>,
}

impl<C> Signed<C>
where
    C: Serialize + DeserializeOwned,
{
    /// Signs `claims` with RS256, tagging the header with `typ` and `kid`
    pub fn sign(claims: &C, typ: &str, kid: &str, key: &EncodingKey) -> DomainResult<Self> {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some(typ.to_string());
        header.kid = Some(kid.to_string());

        let compact =
            jsonwebtoken::encode(&header, claims, key).map_err(|e| DomainError::Internal {
                message: format!("Token signing failed: {}", e),
            })?;

        Ok(Self {
            compact,
            _claims: PhantomData,
        })
    }

    /// Verifies the signature and header, returning the claims
    ///
    /// Only the signature, algorithm, `typ` and `kid` are checked here.
    /// Time and audience rules belong to the caller, which owns the clock.
    pub fn verify(
        &self,
        key: &DecodingKey,
        expected_typ: &str,
        expected_kid: &str,
    ) -> Result<C, RejectionReason> {
        let header = jsonwebtoken::decode_header(&self.compact)
            .map_err(|_| RejectionReason::MalformedToken)?;

        if header.alg != Algorithm::RS256 {
            return Err(RejectionReason::claim(ClaimKind::Algorithm));
        }
        if header.typ.as_deref() != Some(expected_typ) {
            return Err(RejectionReason::claim(ClaimKind::TokenType));
        }
        if header.kid.as_deref() != Some(expected_kid) {
            return Err(RejectionReason::claim(ClaimKind::KeyId));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<C>(&self.compact, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => RejectionReason::SignatureInvalid,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    RejectionReason::claim(ClaimKind::Algorithm)
                }
                ErrorKind::Crypto(_) => RejectionReason::SignatureInvalid,
                _ => RejectionReason::MalformedToken,
            })
    }

    /// Compact JWS form
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    fn from_compact(compact: String) -> Self {
        Self {
            compact,
            _claims: PhantomData,
        }
    }
}

/// Encrypted outer layer wrapping an inner value of type `S`
#[derive(Debug, Clone)]
pub struct Encrypted<S> {
    header: EnvelopeHeader,
    segments: [String; 5],
    _inner: PhantomData<S>,
}

impl<C> Encrypted<Signed<C>>
where
    C: Serialize + DeserializeOwned,
{
    /// Encrypts a signed value to `public_key`
    ///
    /// A fresh content key and IV are drawn for every call. The protected
    /// header is bound to the ciphertext as additional authenticated data.
    pub fn seal(signed: &Signed<C>, kid: &str, public_key: &RsaPublicKey) -> DomainResult<Self> {
        let header = EnvelopeHeader {
            alg: KEY_WRAP_ALGORITHM.to_string(),
            enc: CONTENT_ENCRYPTION.to_string(),
            kid: kid.to_string(),
            cty: Some("JWT".to_string()),
        };
        let header_json = serde_json::to_vec(&header).map_err(|e| DomainError::Internal {
            message: format!("Envelope header encoding failed: {}", e),
        })?;
        let protected = URL_SAFE_NO_PAD.encode(header_json);

        let mut cek = [0u8; CEK_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut cek);
        OsRng.fill_bytes(&mut iv);

        let wrapped_key = public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &cek)
            .map_err(|e| DomainError::Internal {
                message: format!("Content key wrapping failed: {}", e),
            })?;

        let cipher = Aes256Gcm::new_from_slice(&cek).map_err(|e| DomainError::Internal {
            message: format!("Invalid content key: {}", e),
        })?;
        let mut ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: signed.as_str().as_bytes(),
                    aad: protected.as_bytes(),
                },
            )
            .map_err(|e| DomainError::Internal {
                message: format!("Content encryption failed: {}", e),
            })?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(Self {
            header,
            segments: [
                protected,
                URL_SAFE_NO_PAD.encode(wrapped_key),
                URL_SAFE_NO_PAD.encode(iv),
                URL_SAFE_NO_PAD.encode(ciphertext),
                URL_SAFE_NO_PAD.encode(tag),
            ],
            _inner: PhantomData,
        })
    }

    /// Parses a compact token and its protected header without decrypting
    ///
    /// # Returns
    ///
    /// * `Ok(Encrypted)` - Header readable and algorithms supported
    /// * `Err(MalformedToken)` - Wrong segment count or unreadable header
    /// * `Err(ClaimInvalid(Algorithm))` - Unsupported `alg` or `enc`
    pub fn parse(token: &str) -> Result<Self, RejectionReason> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        if parts.len() != 5 {
            return Err(RejectionReason::MalformedToken);
        }

        let header_json = URL_SAFE_NO_PAD
            .decode(parts[0])
            .map_err(|_| RejectionReason::MalformedToken)?;
        let header: EnvelopeHeader =
            serde_json::from_slice(&header_json).map_err(|_| RejectionReason::MalformedToken)?;

        if header.kid.is_empty() {
            return Err(RejectionReason::MalformedToken);
        }
        if header.alg != KEY_WRAP_ALGORITHM || header.enc != CONTENT_ENCRYPTION {
            return Err(RejectionReason::claim(ClaimKind::Algorithm));
        }

        Ok(Self {
            header,
            segments: [
                parts[0].to_string(),
                parts[1].to_string(),
                parts[2].to_string(),
                parts[3].to_string(),
                parts[4].to_string(),
            ],
            _inner: PhantomData,
        })
    }

    /// Decrypts the envelope, yielding the still-unverified signed value
    ///
    /// Every failure is reported as `DecryptionFailed`.
    pub fn open(&self, private_key: &RsaPrivateKey) -> Result<Signed<C>, RejectionReason> {
        let decode = |segment: &str| {
            URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|_| RejectionReason::DecryptionFailed)
        };

        let wrapped_key = decode(&self.segments[1])?;
        let iv = decode(&self.segments[2])?;
        let mut ciphertext = decode(&self.segments[3])?;
        let tag = decode(&self.segments[4])?;

        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return Err(RejectionReason::DecryptionFailed);
        }

        let cek = private_key
            .decrypt(Oaep::new::<Sha256>(), &wrapped_key)
            .map_err(|_| RejectionReason::DecryptionFailed)?;
        if cek.len() != CEK_LEN {
            return Err(RejectionReason::DecryptionFailed);
        }

        let cipher =
            Aes256Gcm::new_from_slice(&cek).map_err(|_| RejectionReason::DecryptionFailed)?;
        ciphertext.extend_from_slice(&tag);

        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: &ciphertext,
                    aad: self.segments[0].as_bytes(),
                },
            )
            .map_err(|_| RejectionReason::DecryptionFailed)?;

        let compact = String::from_utf8(plaintext).map_err(|_| RejectionReason::MalformedToken)?;
        Ok(Signed::from_compact(compact))
    }

    /// Outer protected header
    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    /// Key identifier from the outer header
    pub fn kid(&self) -> &str {
        &self.header.kid
    }

    /// Compact serialization: five base64url segments joined by dots
    pub fn to_compact(&self) -> String {
        self.segments.join(".")
    }
}
