use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use crate::secret::SigningKey;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type so access and refresh payloads share one
/// signing path. Only HS256 is produced and only HS256 is accepted; a token
/// whose header names any other algorithm is rejected before its signature
/// is looked at.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a new JWT handler bound to a signing key.
    ///
    /// # Arguments
    /// * `key` - Key used for both signing and verification
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is checked against a caller-supplied clock, see `TokenValidator`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Self::ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a JWT token and verify its signature.
    ///
    /// Expiry is not checked here.
    ///
    /// # Errors
    /// * `BadSignature` - Signature does not match or algorithm is not HS256
    /// * `MalformedToken` - Token is not a well-formed JWS or claims do not fit `T`
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::BadSignature
                }
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::MalformedToken(e.to_string()),
            })
    }
}
