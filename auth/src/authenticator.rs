use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::access::resolve_bearer;
use crate::access::IdentityResolution;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::SigningKey;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenValidator;
use crate::jwt::ValidationFailure;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::role::Role;

/// Plaintext used to build the decoy hash checked for unknown subjects.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-subjects";

/// Authentication coordinator combining password verification and token handling.
///
/// Provides high-level authentication operations by coordinating
/// password hashing, token issuance and token validation over one shared key.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
    decoy_hash: String,
}

/// Stored credential looked up for a login attempt.
#[derive(Debug, Clone, Copy)]
pub struct StoredCredential<'a> {
    pub subject: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
    /// Claims encoded in the token
    pub claims: Claims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Computes one decoy hash up front so that logins for unknown subjects
    /// cost the same as logins with a wrong password.
    ///
    /// # Arguments
    /// * `signing_key` - Process-wide signing key
    /// * `token_ttl` - Lifetime of issued tokens
    /// * `password_hasher` - Hasher configured with the desired cost
    ///
    /// # Errors
    /// * `JwtError` - Token lifetime is not positive or exceeds ten years
    /// * `PasswordError` - Decoy hash could not be computed
    pub fn new(
        signing_key: Arc<SigningKey>,
        token_ttl: Duration,
        password_hasher: PasswordHasher,
    ) -> Result<Self, AuthenticationError> {
        let issuer = TokenIssuer::new(Arc::clone(&signing_key), token_ttl)?;
        let validator = TokenValidator::new(signing_key);
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            issuer,
            validator,
            decoy_hash,
        })
    }

    /// Create an authenticator from a raw secret with default hashing cost.
    ///
    /// # Errors
    /// * `JwtError` - Secret is missing or too short, or lifetime is out of range
    /// * `PasswordError` - Decoy hash could not be computed
    pub fn from_secret(secret: &[u8], token_ttl: Duration) -> Result<Self, AuthenticationError> {
        let signing_key = Arc::new(SigningKey::from_secret(secret)?);
        Self::new(signing_key, token_ttl, PasswordHasher::new())
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed or unusable
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token.
    ///
    /// An unknown subject (`stored` is `None`) and a wrong password produce
    /// the same error after the same amount of hashing work.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored` - Credential found for the presented subject, if any
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown subject or password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored: Option<StoredCredential<'_>>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let Some(credential) = stored else {
            // Result ignored; the work is what matters
            let _ = self.password_hasher.verify(password, &self.decoy_hash);
            return Err(AuthenticationError::InvalidCredentials);
        };

        let is_valid = self
            .password_hasher
            .verify(password, credential.password_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        self.issue(credential.subject, credential.role, now)
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, when the caller has just proven
    /// knowledge of the password by choosing it.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let claims = self.issuer.claims(subject, role, now)?;
        let access_token = self.issuer.issue(subject, role, now)?;

        Ok(AuthenticationResult {
            access_token,
            claims,
        })
    }

    /// Validate a token.
    ///
    /// # Errors
    /// * `ValidationFailure` - Token is not acceptable at `now`
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ValidationFailure> {
        self.validator.validate(token, now)
    }

    /// Resolve the caller identity from an `Authorization` header value.
    pub fn resolve(&self, authorization: Option<&str>, now: DateTime<Utc>) -> IdentityResolution {
        resolve_bearer(authorization, &self.validator, now)
    }

    /// Lifetime of issued tokens.
    pub fn token_ttl(&self) -> Duration {
        self.issuer.ttl()
    }
}
