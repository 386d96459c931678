use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::Account;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

pub async fn current_account(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<ApiSuccess<CurrentAccountResponseData>, ApiError> {
    // A signed subject that is not an email cannot name a stored account
    let email = EmailAddress::new(identity.subject)
        .map_err(|_| ApiError::NotFound("Account not found".to_string()))?;

    state
        .account_service
        .get_account(&email)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentAccountResponseData {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<&Account> for CurrentAccountResponseData {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.as_str().to_string(),
            name: account.name.as_str().to_string(),
            role: account.role,
            phone: account.phone.as_ref().map(|p| p.as_str().to_string()),
            address: account.address.as_ref().map(|a| a.as_str().to_string()),
        }
    }
}
