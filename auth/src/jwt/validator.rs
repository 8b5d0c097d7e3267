use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use http::header::AUTHORIZATION;
use http::HeaderMap;

use super::claims::AccessClaims;
use super::claims::AccessDetails;
use super::claims::Expiring;
use super::claims::RefreshClaims;
use super::errors::JwtError;
use super::handler::JwtHandler;

const BEARER_SCHEME: &str = "Bearer";

/// Verifies tokens minted by `TokenIssuer` and extracts their claims.
#[derive(Clone)]
pub struct TokenValidator {
    handler: Arc<JwtHandler>,
}

impl TokenValidator {
    pub fn new(handler: Arc<JwtHandler>) -> Self {
        Self { handler }
    }

    /// Verify an access token's signature and decode its claims.
    ///
    /// # Errors
    /// * `BadSignature` - Signed with another key or algorithm
    /// * `MalformedToken` - Not a JWS, not access claims, or not authorized
    pub fn parse_access(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let claims: AccessClaims = self.handler.decode(token)?;
        if !claims.authorized {
            return Err(JwtError::MalformedToken(
                "access token is not authorized".to_string(),
            ));
        }
        Ok(claims)
    }

    /// Verify a refresh token's signature and decode its claims.
    ///
    /// # Errors
    /// * `BadSignature` - Signed with another key or algorithm
    /// * `MalformedToken` - Not a JWS or not refresh claims
    pub fn parse_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.handler.decode(token)
    }

    /// Reject claims whose expiry lies before `now`.
    ///
    /// # Errors
    /// * `ExpiredToken` - `exp` is in the past
    pub fn check_expiry<C: Expiring>(claims: &C, now: DateTime<Utc>) -> Result<(), JwtError> {
        if claims.is_expired(now.timestamp()) {
            Err(JwtError::ExpiredToken)
        } else {
            Ok(())
        }
    }

    /// Read the token out of an `Authorization: Bearer <token>` header.
    ///
    /// The header must split into exactly a scheme and a non-empty token.
    ///
    /// # Errors
    /// * `MissingToken` - Header absent or empty
    /// * `MalformedToken` - Header present but not of the bearer shape
    pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, JwtError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(JwtError::MissingToken)?
            .to_str()
            .map_err(|_| {
                JwtError::MalformedToken("authorization header is not ASCII".to_string())
            })?;

        if value.is_empty() {
            return Err(JwtError::MissingToken);
        }

        let mut parts = value.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None)
                if scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty() =>
            {
                Ok(token)
            }
            _ => Err(JwtError::MalformedToken(
                "expected authorization header of the form 'Bearer <token>'".to_string(),
            )),
        }
    }

    /// Parse and expiry-check a raw access token.
    pub fn access_details_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessDetails, JwtError> {
        let claims = self.parse_access(token)?;
        Self::check_expiry(&claims, now)?;
        Ok(claims.into())
    }

    /// Extract, verify, and expiry-check the bearer token of a request.
    ///
    /// # Errors
    /// * `MissingToken`, `MalformedToken`, `BadSignature`, `ExpiredToken`
    pub fn validate(&self, headers: &HeaderMap) -> Result<AccessDetails, JwtError> {
        self.validate_at(headers, Utc::now())
    }

    pub fn validate_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<AccessDetails, JwtError> {
        let token = Self::extract_bearer(headers)?;
        self.access_details_at(token, now)
    }
}
