use std::str::FromStr;

use auth::Role;
use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::list_accounts::AccountSummaryData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::ValidationErrors;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn assign_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
    body: Result<Json<AssignRoleRequest>, JsonRejection>,
) -> Result<ApiSuccess<AccountSummaryData>, ApiError> {
    let Json(body) = body?;

    let mut errors = ValidationErrors::new();
    let email = errors.check("email", EmailAddress::new(email));
    let role = errors.check("role", Role::from_str(&body.role));
    let (Some(email), Some(role)) = (email, role) else {
        return Err(ApiError::ValidationFailed(errors));
    };

    state
        .account_service
        .assign_role(&email, role)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignRoleRequest {
    #[serde(default)]
    role: String,
}
