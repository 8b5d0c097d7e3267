//! Authentication utilities library
//!
//! Provides the authentication building blocks for the booking services:
//! - Password hashing (Argon2id with configurable cost)
//! - Signing key loading
//! - Access/refresh JWT issuance and validation
//! - Authentication coordination
//!
//! Services define their own storage and HTTP layers and adapt these
//! implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! assert!(hasher.verify("not_my_password", &hash).is_err());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Authenticator, SecretProvider};
//!
//! let secrets = SecretProvider::new();
//! let key = secrets.initialize(|| "secret_key_at_least_32_bytes_long!").unwrap();
//! let auth = Authenticator::new(&key);
//!
//! let pair = auth.generate_tokens(42, "individual").unwrap();
//! let details = auth.validate_token(&pair.access_token).unwrap();
//! assert_eq!(details.user_id, 42);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod secret;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::AccessClaims;
pub use jwt::AccessDetails;
pub use jwt::JwtError;
pub use jwt::RefreshClaims;
pub use jwt::TokenIssuer;
pub use jwt::TokenPair;
pub use jwt::TokenTtl;
pub use jwt::TokenValidator;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use secret::SecretError;
pub use secret::SecretProvider;
pub use secret::SigningKey;
