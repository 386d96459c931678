use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::account::errors::ValidationErrors;
use crate::domain::account::models::DisplayName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Password;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::PostalAddress;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registration (raw JSON)
///
/// Missing fields deserialize as empty so they are reported alongside the
/// other field errors instead of as a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.check("name", DisplayName::new(self.name));
        let email = errors.check("email", EmailAddress::new(self.email));
        let password = errors.check("password", Password::new(self.password));
        let phone = optional(&mut errors, "phone", self.phone, PhoneNumber::new);
        let address = optional(&mut errors, "address", self.address, PostalAddress::new);

        match (name, email, password, phone, address) {
            (Some(name), Some(email), Some(password), Some(phone), Some(address)) => {
                Ok(RegisterCommand {
                    name,
                    email,
                    password,
                    phone,
                    address,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Blank optional fields count as absent.
fn optional<T, E: std::fmt::Display>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    parse: impl FnOnce(String) -> Result<T, E>,
) -> Option<Option<T>> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => errors.check(field, parse(v)).map(Some),
        None => Some(None),
    }
}
