use thiserror::Error;

/// Error type for password operations.
///
/// `Mismatch` is the expected outcome of a wrong password; every other
/// variant is an infrastructure failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid hash cost: {0}")]
    InvalidCost(String),

    #[error("Password does not match")]
    Mismatch,
}
