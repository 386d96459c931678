//! Authentication and authorization library
//!
//! Provides the stateless credential machinery shared by services:
//! - Password hashing (Argon2id)
//! - Signed access tokens (HS256) with explicit issue and validate steps
//! - Per-request identity resolution and role-based route policies
//! - Authentication coordination
//!
//! Services own their storage and transport; this crate never touches either.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Role, SigningKey, TokenIssuer, TokenValidator};
//! use chrono::{Duration, Utc};
//!
//! let key = Arc::new(SigningKey::from_secret(b"secret_key_at_least_32_bytes_long!").unwrap());
//! let issuer = TokenIssuer::new(Arc::clone(&key), Duration::hours(1)).unwrap();
//! let validator = TokenValidator::new(key);
//!
//! let now = Utc::now();
//! let token = issuer.issue("alice@example.com", Role::Standard, now).unwrap();
//! let claims = validator.validate(&token, now).unwrap();
//! assert_eq!(claims.sub, "alice@example.com");
//! ```
//!
//! ## Route Policies
//! ```
//! use auth::{authorize, AccessDenied, IdentityResolution, ResolvedIdentity, Role, RoutePolicy};
//!
//! let policy = RoutePolicy::requires([Role::Admin]);
//! let caller = IdentityResolution::Authenticated(ResolvedIdentity {
//!     subject: "bob@example.com".to_string(),
//!     role: Role::Standard,
//! });
//! assert_eq!(authorize(&policy, &caller), Err(AccessDenied::InsufficientRole));
//! ```

pub mod access;
pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod role;

// Re-export commonly used items
pub use access::authorize;
pub use access::resolve_bearer;
pub use access::AccessDenied;
pub use access::IdentityResolution;
pub use access::ResolvedIdentity;
pub use access::RoutePolicy;
pub use access::UnauthenticatedReason;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::StoredCredential;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::SigningKey;
pub use jwt::TokenIssuer;
pub use jwt::TokenValidator;
pub use jwt::ValidationFailure;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::UnknownRole;
