//! Token entities: claim sets, refresh records and blacklist entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::subject::Subject;

/// `typ` header of the signed layer of an access token
pub const ACCESS_TOKEN_TYPE: &str = "at+jwt";

/// `typ` header of the signed layer of a refresh token
pub const REFRESH_TOKEN_TYPE: &str = "rt+jwt";

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (account ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID; the verifier rejects tokens without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject email at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Subject roles at issuance
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl AccessClaims {
    /// Creates claims for a new access token
    ///
    /// # Arguments
    ///
    /// * `subject` - The subject the token is issued to
    /// * `issuer` - `iss` value
    /// * `audience` - `aud` value
    /// * `issued_at` - Issuance time
    /// * `lifetime` - Access token lifetime
    ///
    /// # Returns
    ///
    /// Claims with a fresh random `jti`
    pub fn new(
        subject: &Subject,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: subject.id.clone(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            email: subject.email.clone(),
            roles: subject.roles.clone(),
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (account ID)
    pub sub: String,

    /// Refresh record identifier
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Lifecycle state of a refresh record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Active,
    Revoked,
}

/// Persisted record backing one issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Token identifier, equal to the token's `jti`
    pub id: String,

    /// Subject the token was issued to
    pub subject_id: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Current status
    pub status: RefreshStatus,

    /// When the record was revoked, if it was
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Creates an active record
    pub fn new(
        id: impl Into<String>,
        subject_id: impl Into<String>,
        created_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            subject_id: subject_id.into(),
            created_at,
            expires_at: created_at + lifetime,
            status: RefreshStatus::Active,
            revoked_at: None,
        }
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks if the record has been revoked
    pub fn is_revoked(&self) -> bool {
        self.status == RefreshStatus::Revoked
    }

    /// A record may back a refresh only while active and unexpired
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }

    /// Marks the record revoked
    ///
    /// # Returns
    ///
    /// `true` if the status changed, `false` if it was already revoked
    pub fn revoke(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.status = RefreshStatus::Revoked;
        self.revoked_at = Some(now);
        true
    }
}

/// Blacklisted access token identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Revoked token's `jti`
    pub jti: String,

    /// The revoked token's own expiry; the entry is garbage after this
    pub expires_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(jti: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti: jti.into(),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Tokens handed out by a successful authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Encrypted access token
    pub access_token: String,

    /// Encrypted refresh token
    pub refresh_token: String,

    /// Access token expiry
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedTokens {
    /// New access token
    pub access_token: String,

    /// Access token expiry
    pub access_expires_at: DateTime<Utc>,

    /// Replacement refresh token, present when rotation on use is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// What a logout actually changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationOutcome {
    /// The refresh record went from active to revoked
    pub refresh_revoked: bool,

    /// The presented access token's `jti` was blacklisted
    pub access_blacklisted: bool,
}
