use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::RawClaims;
use super::errors::ValidationFailure;
use super::signing_key::SigningKey;

/// Verifies access tokens against the shared signing key.
///
/// Checks run cheapest first, but no claim value is looked at before the
/// signature has been verified:
/// 1. three non-empty segments, else `Malformed`
/// 2. HS256 header and matching MAC, else `Malformed` / `InvalidSignature`
/// 3. payload decodes with every required claim, else `Malformed`
/// 4. `now < exp`, else `Expired`
/// 5. role is recognized, else `UnrecognizedRole`
#[derive(Debug, Clone)]
pub struct TokenValidator {
    key: Arc<SigningKey>,
    validation: Validation,
}

impl TokenValidator {
    /// Create a validator bound to the shared signing key.
    pub fn new(key: Arc<SigningKey>) -> Self {
        let mut validation = Validation::new(SigningKey::ALGORITHM);
        // Expiry is checked against the caller's clock below
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self { key, validation }
    }

    /// Validate a token at instant `now`.
    ///
    /// # Arguments
    /// * `token` - Compact token string (without any scheme prefix)
    /// * `now` - Instant the token is evaluated at
    ///
    /// # Returns
    /// Trusted claims
    ///
    /// # Errors
    /// * `Malformed` - Structure, header or payload is unusable
    /// * `InvalidSignature` - MAC does not match
    /// * `Expired` - `now` is at or past the expiration
    /// * `UnrecognizedRole` - Role is outside the known set
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ValidationFailure> {
        if !has_compact_structure(token) {
            return Err(ValidationFailure::Malformed);
        }

        let token_data = decode::<RawClaims>(token, self.key.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => ValidationFailure::InvalidSignature,
                _ => ValidationFailure::Malformed,
            })?;

        let raw_claims = token_data.claims;
        if raw_claims.is_expired(now.timestamp()) {
            return Err(ValidationFailure::Expired);
        }

        raw_claims.into_claims()
    }
}

fn has_compact_structure(token: &str) -> bool {
    let mut segments = 0;
    for segment in token.split('.') {
        if segment.is_empty() {
            return false;
        }
        segments += 1;
    }
    segments == 3
}
