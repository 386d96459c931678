use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use super::errors::ValidationFailure;
use crate::role::Role;

/// Claims carried by every access token.
///
/// Serialized as `{"sub": .., "role": "STANDARD"|"ADMIN", "iat": .., "exp": ..}`
/// with timestamps in Unix seconds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,

    /// Role granted to the subject
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp, exclusive)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject issued at `issued_at` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique subject identifier
    /// * `role` - Role of the subject
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Token lifetime
    ///
    /// # Errors
    /// * `InvalidTtl` - `issued_at + ttl` is not a representable instant
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(JwtError::InvalidTtl(ttl.num_seconds()))?;

        Ok(Self {
            sub: subject.into(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Check if token is expired.
    ///
    /// The expiration instant itself is already outside the validity window.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

/// Payload as read off the wire, before the role is trusted.
///
/// The role stays a string here so that expiry is checked before role
/// recognition, and an unknown role is reported as such instead of as a
/// parse failure.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl RawClaims {
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn into_claims(self) -> Result<Claims, ValidationFailure> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| ValidationFailure::UnrecognizedRole(e.0))?;

        Ok(Claims {
            sub: self.sub,
            role,
            iat: self.iat,
            exp: self.exp,
        })
    }
}
