use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Access role carried by a credential and by every token issued for it.
///
/// The set is closed: anything that does not parse into one of these
/// variants is rejected, never mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular registered account
    Standard,
    /// Administrative account
    Admin,
}

/// Error for role strings outside the recognized set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unrecognized role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::Standard, Role::Admin];

    /// Wire name of the role, as written into tokens and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "STANDARD",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Parse a wire name. Matching is exact: `"admin"` is not `ADMIN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
