use std::fmt;

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::JwtError;

/// Process-wide HMAC key shared by the issuer and the validator.
///
/// Built once at startup and handed out behind an `Arc`; there is no way to
/// replace it at runtime. A new secret invalidates every token issued under
/// the previous one.
pub struct SigningKey {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Shortest secret accepted for HS256.
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Algorithm used for every token.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create the signing key from a shared secret.
    ///
    /// # Arguments
    /// * `secret` - Secret bytes loaded from configuration
    ///
    /// # Errors
    /// * `MisconfiguredSigningKey` - Secret is empty or shorter than 256 bits
    pub fn from_secret(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MisconfiguredSigningKey(
                "no signing secret configured".to_string(),
            ));
        }

        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtError::MisconfiguredSigningKey(format!(
                "signing secret must be at least {} bytes, got {}",
                Self::MIN_SECRET_LENGTH,
                secret.len()
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &Self::ALGORITHM)
            .finish_non_exhaustive()
    }
}
