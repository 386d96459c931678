use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::account::errors::AccountError;
use crate::account::errors::ValidationErrors;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Password;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    let command = body.try_into_command()?;

    let email = EmailAddress::new(identity.subject)
        .map_err(|_| ApiError::NotFound("Account not found".to_string()))?;

    state
        .account_service
        .change_password(&email, command)
        .await
        .map_err(|e| match e {
            // The caller is already authenticated; a wrong current password is an input error
            AccountError::InvalidCredentials => ApiError::ValidationFailed(
                ValidationErrors::single("current_password", "Current password is incorrect"),
            ),
            _ => ApiError::from(e),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
}

impl ChangePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.current_password.is_empty() {
            errors.add("current_password", "Password must not be empty");
        }
        let new_password = errors.check("new_password", Password::new(self.new_password));

        match new_password {
            Some(new_password) if errors.is_empty() => Ok(ChangePasswordCommand {
                current_password: self.current_password,
                new_password,
            }),
            _ => Err(errors),
        }
    }
}
