pub mod claims;
pub mod errors;
pub mod issuer;
pub mod signing_key;
pub mod validator;

pub use claims::Claims;
pub use errors::JwtError;
pub use errors::ValidationFailure;
pub use issuer::TokenIssuer;
pub use signing_key::SigningKey;
pub use validator::TokenValidator;
