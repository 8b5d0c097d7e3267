use thiserror::Error;

/// Error type for JWT operations.
///
/// The four rejection variants (`MissingToken`, `MalformedToken`,
/// `BadSignature`, `ExpiredToken`) are kept apart for diagnostics; callers
/// facing clients are expected to collapse them into a single 401.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is expired")]
    ExpiredToken,
}

impl JwtError {
    /// True for every failure caused by what the client presented.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, JwtError::EncodingFailed(_))
    }
}
