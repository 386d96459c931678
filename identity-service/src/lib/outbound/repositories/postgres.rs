use std::str::FromStr;

use async_trait::async_trait;
use auth::Role;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::DisplayName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::PostalAddress;
use crate::domain::account::ports::CredentialRepository;

const ACCOUNT_COLUMNS: &str =
    "id, email, name, phone, address, password_hash, role, created_at";

pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> AccountError {
    AccountError::StoreUnavailable(e.to_string())
}

fn corrupt(field: &str, e: impl std::fmt::Display) -> AccountError {
    AccountError::Unknown(format!("Stored account has invalid {}: {}", field, e))
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    let email: String = row.try_get("email").map_err(store_error)?;
    let name: String = row.try_get("name").map_err(store_error)?;
    let phone: Option<String> = row.try_get("phone").map_err(store_error)?;
    let address: Option<String> = row.try_get("address").map_err(store_error)?;
    let role: String = row.try_get("role").map_err(store_error)?;

    Ok(Account {
        id: AccountId(row.try_get("id").map_err(store_error)?),
        email: EmailAddress::new(email).map_err(|e| corrupt("email", e))?,
        name: DisplayName::new(name).map_err(|e| corrupt("name", e))?,
        phone: phone
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|e| corrupt("phone", e))?,
        address: address
            .map(PostalAddress::new)
            .transpose()
            .map_err(|e| corrupt("address", e))?,
        password_hash: row.try_get("password_hash").map_err(store_error)?,
        role: Role::from_str(&role).map_err(|e| corrupt("role", e))?,
        created_at: row.try_get("created_at").map_err(store_error)?,
    })
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, phone, address, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.name.as_str())
        .bind(account.phone.as_ref().map(PhoneNumber::as_str))
        .bind(account.address.as_ref().map(PostalAddress::as_str))
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("accounts_email_key")
                {
                    return AccountError::EmailAlreadyExists(account.email.as_str().to_string());
                }
            }
            store_error(e)
        })?;

        Ok(account)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts ORDER BY created_at ASC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(account_from_row).collect()
    }

    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: String,
    ) -> Result<(), AccountError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(email.to_string()));
        }

        Ok(())
    }

    async fn update_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET role = $2 WHERE email = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(email.as_str())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(AccountError::NotFound(email.to_string())),
        }
    }
}
