use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use thiserror::Error;

/// Error type for signing key operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Signing key has not been initialized")]
    Uninitialized,

    #[error("Signing key too short: minimum {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Symmetric key shared by token signing and verification.
///
/// Cloning is cheap and every clone refers to the same immutable bytes.
/// The bytes are never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    /// HS256 keys shorter than the digest size weaken the MAC.
    pub const MIN_LENGTH: usize = 32;

    /// Build a signing key from raw bytes.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 32 bytes were supplied
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, SecretError> {
        let bytes = bytes.as_ref();
        if bytes.len() < Self::MIN_LENGTH {
            return Err(SecretError::TooShort {
                min: Self::MIN_LENGTH,
                actual: bytes.len(),
            });
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// One-shot holder for the process signing key.
///
/// `initialize` is idempotent: the first successful call wins and later
/// calls return the already stored key. Initialization is synchronized, so
/// no reader can observe a partially written key.
#[derive(Debug, Default)]
pub struct SecretProvider {
    key: OnceLock<SigningKey>,
}

impl SecretProvider {
    pub const fn new() -> Self {
        Self {
            key: OnceLock::new(),
        }
    }

    /// Load the signing key from the configured secret.
    ///
    /// # Arguments
    /// * `load` - Source of the secret, only invoked on the first call
    ///
    /// # Errors
    /// * `TooShort` - The loaded secret is not a usable key
    pub fn initialize<F, B>(&self, load: F) -> Result<SigningKey, SecretError>
    where
        F: FnOnce() -> B,
        B: AsRef<[u8]>,
    {
        if let Some(key) = self.key.get() {
            return Ok(key.clone());
        }
        let key = SigningKey::new(load())?;
        Ok(self.key.get_or_init(|| key).clone())
    }

    /// Fetch the signing key.
    ///
    /// # Errors
    /// * `Uninitialized` - `initialize` has not succeeded yet
    pub fn signing_key(&self) -> Result<SigningKey, SecretError> {
        self.key.get().cloned().ok_or(SecretError::Uninitialized)
    }
}
