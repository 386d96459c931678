use async_trait::async_trait;
use auth::Role;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::models::Session;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new STANDARD account and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated command containing name, email, password and optional profile
    ///
    /// # Returns
    /// Created account with a signed access token
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `StoreUnavailable` - Credential store operation failed
    /// * `Unknown` - Hashing or signing failed
    async fn register(&self, command: RegisterCommand) -> Result<Session, AccountError>;

    /// Verify an email and password pair and issue a token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `StoreUnavailable` - Credential store operation failed
    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError>;

    /// Retrieve account by email.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `StoreUnavailable` - Credential store operation failed
    async fn get_account(&self, email: &EmailAddress) -> Result<Account, AccountError>;

    /// Replace the password of an account after checking the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not match
    /// * `NotFound` - No account with this email
    /// * `StoreUnavailable` - Credential store operation failed
    async fn change_password(
        &self,
        email: &EmailAddress,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;

    /// Retrieve all accounts, oldest first.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store operation failed
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError>;

    /// Change the role of an account.
    ///
    /// Tokens issued before the change keep their old role until they expire.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `StoreUnavailable` - Credential store operation failed
    async fn assign_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError>;

    /// Ensure an ADMIN account exists for the given credentials.
    ///
    /// Creates the account as ADMIN when absent, promotes it when present with
    /// another role. An existing password is never overwritten.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store operation failed
    /// * `Unknown` - Hashing failed
    async fn bootstrap_admin(&self, command: RegisterCommand) -> Result<Account, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Persist new account.
    ///
    /// Email uniqueness is enforced here, atomically with the insert.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `StoreUnavailable` - Storage operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by email.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;

    /// Retrieve all accounts ordered by creation time.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage operation failed
    async fn list_all(&self) -> Result<Vec<Account>, AccountError>;

    /// Replace the stored password hash.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StoreUnavailable` - Storage operation failed
    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: String,
    ) -> Result<(), AccountError>;

    /// Replace the stored role.
    ///
    /// # Returns
    /// Updated account entity
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StoreUnavailable` - Storage operation failed
    async fn update_role(&self, email: &EmailAddress, role: Role) -> Result<Account, AccountError>;
}
