use std::fmt;
use std::str::FromStr;

use auth::Role;
use auth::StoredCredential;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AddressError;
use crate::account::errors::EmailError;
use crate::account::errors::NameError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::PhoneError;

/// Account aggregate entity.
///
/// Holds the credential (email as subject, password hash, role) together with
/// the profile captured at registration. Only the password hash and the role
/// change after creation. Never serialized directly to clients.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub name: DisplayName,
    pub phone: Option<PhoneNumber>,
    pub address: Option<PostalAddress>,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Borrow the parts needed to verify a login.
    pub fn stored_credential(&self) -> StoredCredential<'_> {
        StoredCredential {
            subject: self.email.as_str(),
            password_hash: &self.password_hash,
            role: self.role,
        }
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type, the subject identifier of an account.
///
/// Validates email format using RFC 5322 compliant parser. Stored trimmed and
/// lowercased so that one mailbox maps to one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, 1-100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password accepted for hashing.
///
/// Lives only as long as the request that carries it; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 128;

    /// Apply the password policy.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `TooLong` - More than 128 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Phone number value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MAX_LENGTH: usize = 32;

    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let phone = phone.trim().to_string();
        let length = phone.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
        if !allowed || !phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacters);
        }

        Ok(Self(phone))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Postal address value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress(String);

impl PostalAddress {
    const MAX_LENGTH: usize = 255;

    pub fn new(address: String) -> Result<Self, AddressError> {
        let address = address.trim().to_string();
        let length = address.chars().count();
        if length == 0 {
            Err(AddressError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(AddressError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(address))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
    pub phone: Option<PhoneNumber>,
    pub address: Option<PostalAddress>,
}

/// Command to log in with an email and a plaintext password.
///
/// The password is not checked against the registration policy: an account
/// created under an older policy must still be able to log in.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

/// Command to replace the password of the calling account
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: Password,
}

/// Account paired with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: String,
}
