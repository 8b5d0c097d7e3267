use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims with an absolute expiry.
pub trait Expiring {
    /// Expiration time (Unix seconds).
    fn expires_at(&self) -> i64;

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token stays valid during the second named by `exp`.
    fn is_expired(&self, current_timestamp: i64) -> bool {
        self.expires_at() < current_timestamp
    }
}

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub user_id: u64,

    /// Role the user authenticated as
    pub account_type: String,

    /// Unique token identifier, fresh for every issuance
    pub access_uuid: Uuid,

    /// Always `true` for tokens minted by this crate
    pub authorized: bool,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create access claims expiring `ttl` after `issued_at`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `account_type` - Role string carried for authorization checks
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Lifetime of the token
    pub fn new(
        user_id: u64,
        account_type: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            user_id,
            account_type: account_type.into(),
            access_uuid: Uuid::new_v4(),
            authorized: true,
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

impl Expiring for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Payload of a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Subject (user identifier)
    pub user_id: u64,

    /// Unique token identifier, independent from the access token's
    pub refresh_uuid: Uuid,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(user_id: u64, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id,
            refresh_uuid: Uuid::new_v4(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Access and refresh tokens handed to the client after authentication.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_uuid: Uuid,
    pub refresh_uuid: Uuid,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
}

/// Identity resolved from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDetails {
    pub user_id: u64,
    pub access_uuid: Uuid,
    pub account_type: String,
}

impl From<AccessClaims> for AccessDetails {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.user_id,
            access_uuid: claims.access_uuid,
            account_type: claims.account_type,
        }
    }
}
