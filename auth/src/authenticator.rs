use std::sync::Arc;

use http::HeaderMap;

use crate::jwt::AccessDetails;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenPair;
use crate::jwt::TokenTtl;
use crate::jwt::TokenValidator;
use crate::password::HashCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::secret::SigningKey;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Issuer and validator share one `JwtHandler`, hence one signing key.
#[derive(Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with default cost and lifetimes.
    ///
    /// # Arguments
    /// * `key` - Secret key for JWT signing
    pub fn new(key: &SigningKey) -> Self {
        Self::with_parts(key, PasswordHasher::new(), TokenTtl::default())
    }

    /// Create an authenticator from explicit settings.
    ///
    /// # Arguments
    /// * `key` - Secret key for JWT signing
    /// * `cost` - Work factor for new password hashes
    /// * `ttl` - Access and refresh token lifetimes
    ///
    /// # Errors
    /// * `InvalidCost` - Cost parameters rejected by the hasher
    pub fn configured(
        key: &SigningKey,
        cost: HashCost,
        ttl: TokenTtl,
    ) -> Result<Self, PasswordError> {
        Ok(Self::with_parts(key, PasswordHasher::with_cost(cost)?, ttl))
    }

    fn with_parts(key: &SigningKey, password_hasher: PasswordHasher, ttl: TokenTtl) -> Self {
        let handler = Arc::new(JwtHandler::new(key));
        Self {
            password_hasher,
            issuer: TokenIssuer::new(Arc::clone(&handler), ttl),
            validator: TokenValidator::new(handler),
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be used
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        self.password_hasher
            .verify(password, stored_hash)
            .map_err(|e| match e {
                PasswordError::Mismatch => AuthenticationError::InvalidCredentials,
                other => AuthenticationError::PasswordError(other),
            })
    }

    /// Verify credentials and generate a token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the tokens
    /// * `account_type` - Role carried by the access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: u64,
        account_type: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        self.verify_password(password, stored_hash)?;

        Ok(self.issuer.issue_token_pair(user_id, account_type)?)
    }

    /// Generate a token pair without password verification.
    ///
    /// Useful when authentication has already been verified by other means.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_tokens(&self, user_id: u64, account_type: &str) -> Result<TokenPair, JwtError> {
        self.issuer.issue_token_pair(user_id, account_type)
    }

    /// Validate the bearer token of a request.
    ///
    /// # Errors
    /// * `JwtError` - Token missing, malformed, forged, or expired
    pub fn validate_request(&self, headers: &HeaderMap) -> Result<AccessDetails, JwtError> {
        self.validator.validate(headers)
    }

    /// Validate a raw access token.
    ///
    /// # Errors
    /// * `JwtError` - Token malformed, forged, or expired
    pub fn validate_token(&self, token: &str) -> Result<AccessDetails, JwtError> {
        self.validator.access_details_at(token, chrono::Utc::now())
    }
}
