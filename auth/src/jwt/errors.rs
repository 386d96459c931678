use thiserror::Error;

/// Error type for token issuance and key setup.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Signing key is misconfigured: {0}")]
    MisconfiguredSigningKey(String),

    #[error("Token lifetime is out of range: {0} seconds")]
    InvalidTtl(i64),
}

/// Reason a presented token was not accepted.
///
/// Fine-grained for logs and tests. The HTTP boundary collapses every
/// variant into one generic 401.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token carries an unrecognized role: {0}")]
    UnrecognizedRole(String),
}
