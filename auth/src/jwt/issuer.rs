use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::AccessClaims;
use super::claims::RefreshClaims;
use super::claims::TokenPair;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Lifetimes of issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// Mints signed access and refresh tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    handler: Arc<JwtHandler>,
    ttl: TokenTtl,
}

impl TokenIssuer {
    pub fn new(handler: Arc<JwtHandler>, ttl: TokenTtl) -> Self {
        Self { handler, ttl }
    }

    pub fn ttl(&self) -> TokenTtl {
        self.ttl
    }

    /// Issue an access token expiring one access TTL from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_access_token(
        &self,
        user_id: u64,
        account_type: &str,
    ) -> Result<(String, AccessClaims), JwtError> {
        self.issue_access_token_at(user_id, account_type, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        user_id: u64,
        account_type: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, AccessClaims), JwtError> {
        let claims = AccessClaims::new(user_id, account_type, now, self.ttl.access);
        let token = self.handler.encode(&claims)?;
        Ok((token, claims))
    }

    /// Issue a refresh token expiring one refresh TTL from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_refresh_token(&self, user_id: u64) -> Result<(String, RefreshClaims), JwtError> {
        self.issue_refresh_token_at(user_id, Utc::now())
    }

    pub fn issue_refresh_token_at(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(String, RefreshClaims), JwtError> {
        let claims = RefreshClaims::new(user_id, now, self.ttl.refresh);
        let token = self.handler.encode(&claims)?;
        Ok((token, claims))
    }

    /// Issue both tokens for one authentication.
    ///
    /// Either both tokens are returned or neither is.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing either token failed
    pub fn issue_token_pair(&self, user_id: u64, account_type: &str) -> Result<TokenPair, JwtError> {
        self.issue_token_pair_at(user_id, account_type, Utc::now())
    }

    pub fn issue_token_pair_at(
        &self,
        user_id: u64,
        account_type: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let (access_token, access) = self.issue_access_token_at(user_id, account_type, now)?;
        let (refresh_token, refresh) = self.issue_refresh_token_at(user_id, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_uuid: access.access_uuid,
            refresh_uuid: refresh.refresh_uuid,
            access_expires_at: access.exp,
            refresh_expires_at: refresh.exp,
        })
    }
}
