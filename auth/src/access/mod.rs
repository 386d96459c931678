pub mod identity;
pub mod policy;

pub use identity::resolve_bearer;
pub use identity::IdentityResolution;
pub use identity::ResolvedIdentity;
pub use identity::BEARER_SCHEME;
pub use policy::authorize;
pub use policy::AccessDenied;
pub use policy::RoutePolicy;
pub use policy::UnauthenticatedReason;
