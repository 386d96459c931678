use std::collections::BTreeSet;

use thiserror::Error;

use super::identity::IdentityResolution;
use crate::role::Role;

/// Access requirement attached to a route when it is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Anyone, with or without a valid token
    Public,
    /// Any caller holding a valid token
    AnyAuthenticated,
    /// A caller holding a valid token whose role is in the set
    RequiresRole(BTreeSet<Role>),
}

impl RoutePolicy {
    /// Policy admitting only the given roles.
    pub fn requires(roles: impl IntoIterator<Item = Role>) -> Self {
        RoutePolicy::RequiresRole(roles.into_iter().collect())
    }
}

/// Why the caller is considered unauthenticated.
///
/// The individual token failure never leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnauthenticatedReason {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Refusal produced by [`authorize`].
///
/// `Unauthenticated` means "who are you" (401), `InsufficientRole` means
/// "known, but not allowed" (403). The two are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("{0}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("Insufficient role for this resource")]
    InsufficientRole,
}

/// Decide whether a request may reach the route's handler.
///
/// # Arguments
/// * `policy` - Requirement declared for the route
/// * `resolution` - Identity resolved for the request
///
/// # Errors
/// * `Unauthenticated(MissingToken)` - Route needs a token and none was sent
/// * `Unauthenticated(InvalidToken)` - Route needs a token and the one sent was refused
/// * `InsufficientRole` - Valid token whose role is not admitted
pub fn authorize(policy: &RoutePolicy, resolution: &IdentityResolution) -> Result<(), AccessDenied> {
    let identity = match (policy, resolution) {
        (RoutePolicy::Public, _) => return Ok(()),
        (_, IdentityResolution::Anonymous) => {
            return Err(AccessDenied::Unauthenticated(
                UnauthenticatedReason::MissingToken,
            ))
        }
        (_, IdentityResolution::Rejected(_)) => {
            return Err(AccessDenied::Unauthenticated(
                UnauthenticatedReason::InvalidToken,
            ))
        }
        (_, IdentityResolution::Authenticated(identity)) => identity,
    };

    match policy {
        RoutePolicy::RequiresRole(roles) if !roles.contains(&identity.role) => {
            Err(AccessDenied::InsufficientRole)
        }
        _ => Ok(()),
    }
}
