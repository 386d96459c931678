pub mod argon2;
pub mod errors;

pub use self::argon2::HashCost;
pub use self::argon2::PasswordHasher;
pub use errors::PasswordError;
