use chrono::DateTime;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::TokenValidator;
use crate::jwt::ValidationFailure;
use crate::role::Role;

/// Authentication scheme expected in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

/// Identity of the caller, valid for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub subject: String,
    pub role: Role,
}

impl From<Claims> for ResolvedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }
}

/// Terminal outcome of identity resolution for one request.
///
/// Exactly one is reached per request. A rejected token does not end the
/// request by itself: whether it matters is up to the route's policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolution {
    /// No credential was presented
    Anonymous,
    /// A valid token was presented
    Authenticated(ResolvedIdentity),
    /// A credential was presented and refused
    Rejected(ValidationFailure),
}

impl IdentityResolution {
    /// Authenticated identity, if any.
    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        match self {
            IdentityResolution::Authenticated(identity) => Some(identity),
            IdentityResolution::Anonymous | IdentityResolution::Rejected(_) => None,
        }
    }
}

/// Resolve the caller's identity from the raw `Authorization` header value.
///
/// # Arguments
/// * `authorization` - Header value, `None` when the header is absent
/// * `validator` - Token validator bound to the process signing key
/// * `now` - Instant of the request
///
/// # Returns
/// `Anonymous` without a header, `Rejected(Malformed)` for a header that is
/// not `Bearer <token>`, otherwise the validation outcome
pub fn resolve_bearer(
    authorization: Option<&str>,
    validator: &TokenValidator,
    now: DateTime<Utc>,
) -> IdentityResolution {
    let Some(header) = authorization else {
        return IdentityResolution::Anonymous;
    };

    let Some(token) = extract_bearer_token(header) else {
        return IdentityResolution::Rejected(ValidationFailure::Malformed);
    };

    match validator.validate(token, now) {
        Ok(claims) => IdentityResolution::Authenticated(claims.into()),
        Err(failure) => IdentityResolution::Rejected(failure),
    }
}

fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
