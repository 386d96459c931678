use std::collections::HashMap;

use async_trait::async_trait;
use auth::Role;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::CredentialRepository;

/// Process-local credential store keyed by normalized email.
///
/// Used when no database is configured and by the integration tests.
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;
        let key = account.email.as_str().to_string();

        if accounts.contains_key(&key) {
            return Err(AccountError::EmailAlreadyExists(key));
        }

        accounts.insert(key, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(email.as_str()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by_key(|account| account.created_at);
        Ok(accounts)
    }

    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: String,
    ) -> Result<(), AccountError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(email.as_str())
            .ok_or_else(|| AccountError::NotFound(email.to_string()))?;

        account.password_hash = password_hash;
        Ok(())
    }

    async fn update_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(email.as_str())
            .ok_or_else(|| AccountError::NotFound(email.to_string()))?;

        account.role = role;
        Ok(account.clone())
    }
}
