use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::JwtError;
use super::signing_key::SigningKey;
use crate::role::Role;

/// Produces signed access tokens.
///
/// Output is the compact `header.payload.signature` form, each segment
/// base64url-encoded without padding. Signing is deterministic: the same
/// subject, role, instant and key always yield the same token.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Longest accepted token lifetime, ten years.
    pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

    /// Create an issuer bound to the shared signing key.
    ///
    /// # Arguments
    /// * `key` - Process-wide signing key
    /// * `ttl` - Lifetime of every issued token
    ///
    /// # Errors
    /// * `InvalidTtl` - Lifetime is zero, negative or longer than `MAX_TTL_SECONDS`
    pub fn new(key: Arc<SigningKey>, ttl: Duration) -> Result<Self, JwtError> {
        if ttl <= Duration::zero() || ttl > Duration::seconds(Self::MAX_TTL_SECONDS) {
            return Err(JwtError::InvalidTtl(ttl.num_seconds()));
        }

        Ok(Self { key, ttl })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` with `role`, valid from `now` for the configured lifetime.
    ///
    /// # Errors
    /// * `InvalidTtl` - Expiry falls past the last representable instant
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(&self, subject: &str, role: Role, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = self.claims(subject, role, now)?;
        self.encode(&claims)
    }

    /// Claims a token issued at `now` would carry.
    ///
    /// # Errors
    /// * `InvalidTtl` - Expiry falls past the last representable instant
    pub fn claims(&self, subject: &str, role: Role, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        Claims::new(subject, role, now, self.ttl)
    }

    fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(SigningKey::ALGORITHM);

        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }
}
