use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Role;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::models::Session;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialRepository;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
/// Argon2 work runs on the blocking pool so request workers stay responsive.
pub struct AccountService<CR>
where
    CR: CredentialRepository,
{
    repository: Arc<CR>,
    authenticator: Arc<Authenticator>,
}

impl<CR> AccountService<CR>
where
    CR: CredentialRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential persistence implementation
    /// * `authenticator` - Shared hasher, issuer and validator
    pub fn new(repository: Arc<CR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, AccountError>
    where
        T: Send + 'static,
        F: FnOnce(&Authenticator) -> Result<T, AccountError> + Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || work(authenticator.as_ref()))
            .await
            .map_err(|e| AccountError::Unknown(format!("Blocking task failed: {}", e)))?
    }

    async fn hash(&self, password: String) -> Result<String, AccountError> {
        self.run_blocking(move |authenticator| {
            authenticator
                .hash_password(&password)
                .map_err(|e| AccountError::Unknown(format!("Password hashing failed: {}", e)))
        })
        .await
    }

    async fn create_account(
        &self,
        command: RegisterCommand,
        role: Role,
    ) -> Result<Account, AccountError> {
        let password_hash = self.hash(command.password.expose().to_string()).await?;

        let account = Account {
            id: AccountId::new(),
            email: command.email,
            name: command.name,
            phone: command.phone,
            address: command.address,
            password_hash,
            role,
            created_at: Utc::now(),
        };

        self.repository.create(account).await
    }
}

#[async_trait]
impl<CR> AccountServicePort for AccountService<CR>
where
    CR: CredentialRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Session, AccountError> {
        let account = self.create_account(command, Role::Standard).await?;

        let issued = self
            .authenticator
            .issue(account.email.as_str(), account.role, Utc::now())?;

        tracing::info!(subject = %account.email, "Account registered");

        Ok(Session {
            account,
            token: issued.access_token,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError> {
        let stored = self.repository.find_by_email(&command.email).await?;
        let password = command.password;

        let result = self
            .run_blocking(move |authenticator| {
                let issued = authenticator.authenticate(
                    &password,
                    stored.as_ref().map(Account::stored_credential),
                    Utc::now(),
                )?;

                match stored {
                    Some(account) => Ok(Session {
                        account,
                        token: issued.access_token,
                    }),
                    None => Err(AccountError::InvalidCredentials),
                }
            })
            .await;

        match &result {
            Ok(session) => tracing::info!(subject = %session.account.email, "Login succeeded"),
            Err(AccountError::InvalidCredentials) => {
                tracing::info!(subject = %command.email, "Login rejected")
            }
            Err(e) => tracing::error!(subject = %command.email, "Login failed: {}", e),
        }

        result
    }

    async fn get_account(&self, email: &EmailAddress) -> Result<Account, AccountError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound(email.to_string()))
    }

    async fn change_password(
        &self,
        email: &EmailAddress,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        let account = self.get_account(email).await?;

        let password_hash = self
            .run_blocking(move |authenticator| {
                let matches = authenticator
                    .verify_password(&command.current_password, &account.password_hash)
                    .map_err(|e| {
                        AccountError::Unknown(format!("Password verification failed: {}", e))
                    })?;
                if !matches {
                    return Err(AccountError::InvalidCredentials);
                }

                authenticator
                    .hash_password(command.new_password.expose())
                    .map_err(|e| AccountError::Unknown(format!("Password hashing failed: {}", e)))
            })
            .await?;

        self.repository
            .update_password_hash(email, password_hash)
            .await?;

        tracing::info!(subject = %email, "Password changed");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        self.repository.list_all().await
    }

    async fn assign_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError> {
        let account = self.repository.update_role(email, role).await?;
        tracing::info!(subject = %email, role = %role, "Role assigned");
        Ok(account)
    }

    async fn bootstrap_admin(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        match self.repository.find_by_email(&command.email).await? {
            Some(account) if account.role == Role::Admin => Ok(account),
            Some(account) => self.assign_role(&account.email, Role::Admin).await,
            None => {
                let email = command.email.clone();
                match self.create_account(command, Role::Admin).await {
                    Ok(account) => {
                        tracing::info!(subject = %account.email, "Administrator account created");
                        Ok(account)
                    }
                    // Registered concurrently; promote instead
                    Err(AccountError::EmailAlreadyExists(_)) => {
                        self.assign_role(&email, Role::Admin).await
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::HashCost;
    use auth::PasswordHasher;
    use auth::SigningKey;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::account::models::DisplayName;
    use crate::account::models::Password;

    mock! {
        pub TestCredentialRepository {}

        #[async_trait]
        impl CredentialRepository for TestCredentialRepository {
            async fn create(&self, account: Account) -> Result<Account, AccountError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;
            async fn list_all(&self) -> Result<Vec<Account>, AccountError>;
            async fn update_password_hash(&self, email: &EmailAddress, password_hash: String) -> Result<(), AccountError>;
            async fn update_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        let key = Arc::new(SigningKey::from_secret(b"service_test_secret_at_least_32_bytes").unwrap());
        let hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        Arc::new(Authenticator::new(key, Duration::hours(1), hasher).unwrap())
    }

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value.to_string()).unwrap()
    }

    fn register_command(address: &str) -> RegisterCommand {
        RegisterCommand {
            name: DisplayName::new("Alice".to_string()).unwrap(),
            email: email(address),
            password: Password::new("password123".to_string()).unwrap(),
            phone: None,
            address: None,
        }
    }

    fn stored_account(authenticator: &Authenticator, address: &str, role: Role) -> Account {
        Account {
            id: AccountId::new(),
            email: email(address),
            name: DisplayName::new("Alice".to_string()).unwrap(),
            phone: None,
            address: None,
            password_hash: authenticator.hash_password("password123").unwrap(),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();

        repository
            .expect_create()
            .withf(|account| {
                account.email.as_str() == "alice@example.com"
                    && account.role == Role::Standard
                    && account.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = AccountService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .register(register_command("alice@example.com"))
            .await
            .unwrap();

        assert_eq!(session.account.role, Role::Standard);
        let claims = authenticator
            .validate_token(&session.token, Utc::now())
            .unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.role, Role::Standard);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestCredentialRepository::new();

        repository.expect_create().times(1).returning(|account| {
            Err(AccountError::EmailAlreadyExists(
                account.email.as_str().to_string(),
            ))
        });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.register(register_command("alice@example.com")).await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "alice@example.com", Role::Admin);

        repository
            .expect_find_by_email()
            .withf(|e| e.as_str() == "alice@example.com")
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = AccountService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .login(LoginCommand {
                email: email("alice@example.com"),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let claims = authenticator
            .validate_token(&session.token, Utc::now())
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_are_indistinguishable() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "alice@example.com", Role::Standard);

        repository
            .expect_find_by_email()
            .returning(move |e| {
                if e.as_str() == "alice@example.com" {
                    Ok(Some(account.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = AccountService::new(Arc::new(repository), authenticator);

        let wrong_password = service
            .login(LoginCommand {
                email: email("alice@example.com"),
                password: "not-the-password".to_string(),
            })
            .await;
        let unknown_email = service
            .login(LoginCommand {
                email: email("nobody@example.com"),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(wrong_password, Err(AccountError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_store_failure_is_not_invalid_credentials() {
        let mut repository = MockTestCredentialRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(AccountError::StoreUnavailable("connection refused".to_string())));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .login(LoginCommand {
                email: email("alice@example.com"),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AccountError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let mut repository = MockTestCredentialRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.get_account(&email("ghost@example.com")).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "alice@example.com", Role::Standard);
        let old_hash = account.password_hash.clone();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        repository
            .expect_update_password_hash()
            .withf(move |e, hash| {
                e.as_str() == "alice@example.com" && hash.starts_with("$argon2") && *hash != old_hash
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = AccountService::new(Arc::new(repository), authenticator);

        let result = service
            .change_password(
                &email("alice@example.com"),
                ChangePasswordCommand {
                    current_password: "password123".to_string(),
                    new_password: Password::new("new-password-456".to_string()).unwrap(),
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "alice@example.com", Role::Standard);

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        repository.expect_update_password_hash().times(0);

        let service = AccountService::new(Arc::new(repository), authenticator);

        let result = service
            .change_password(
                &email("alice@example.com"),
                ChangePasswordCommand {
                    current_password: "wrong-password".to_string(),
                    new_password: Password::new("new-password-456".to_string()).unwrap(),
                },
            )
            .await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_assign_role() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let mut promoted = stored_account(&authenticator, "bob@example.com", Role::Standard);
        promoted.role = Role::Admin;

        repository
            .expect_update_role()
            .withf(|e, role| e.as_str() == "bob@example.com" && *role == Role::Admin)
            .times(1)
            .returning(move |_, _| Ok(promoted.clone()));

        let service = AccountService::new(Arc::new(repository), authenticator);

        let account = service
            .assign_role(&email("bob@example.com"), Role::Admin)
            .await
            .unwrap();
        assert_eq!(account.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_creates_missing_account() {
        let mut repository = MockTestCredentialRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|account| account.role == Role::Admin)
            .times(1)
            .returning(|account| Ok(account));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let account = service
            .bootstrap_admin(register_command("root@example.com"))
            .await
            .unwrap();
        assert_eq!(account.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_promotes_existing_account() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let existing = stored_account(&authenticator, "root@example.com", Role::Standard);
        let mut promoted = existing.clone();
        promoted.role = Role::Admin;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);
        repository
            .expect_update_role()
            .times(1)
            .returning(move |_, _| Ok(promoted.clone()));

        let service = AccountService::new(Arc::new(repository), authenticator);

        let account = service
            .bootstrap_admin(register_command("root@example.com"))
            .await
            .unwrap();
        assert_eq!(account.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_leaves_existing_admin_alone() {
        let mut repository = MockTestCredentialRepository::new();
        let authenticator = authenticator();
        let existing = stored_account(&authenticator, "root@example.com", Role::Admin);

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);
        repository.expect_update_role().times(0);

        let service = AccountService::new(Arc::new(repository), authenticator);

        let account = service
            .bootstrap_admin(register_command("root@example.com"))
            .await
            .unwrap();
        assert_eq!(account.role, Role::Admin);
    }
}
