use std::sync::Arc;

use auth::Authenticator;
use auth::HashCost;
use auth::PasswordHasher;
use auth::SigningKey;
use identity_service::account::models::DisplayName;
use identity_service::account::models::EmailAddress;
use identity_service::account::models::Password;
use identity_service::account::models::RegisterCommand;
use identity_service::account::ports::AccountServicePort;
use identity_service::account::service::AccountService;
use identity_service::inbound::http::router::create_router;
use identity_service::repositories::InMemoryCredentialRepository;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password-123";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub repository: Arc<InMemoryCredentialRepository>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    ///
    /// Uses the in-memory credential store, a cheap Argon2 cost and a seeded
    /// administrator.
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let signing_key =
            Arc::new(SigningKey::from_secret(TEST_SECRET).expect("Failed to build signing key"));
        let password_hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");
        let authenticator = Arc::new(
            Authenticator::new(signing_key, chrono::Duration::hours(1), password_hasher)
                .expect("Failed to build authenticator"),
        );

        let repository = Arc::new(InMemoryCredentialRepository::new());
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));

        account_service
            .bootstrap_admin(RegisterCommand {
                name: DisplayName::new("Admin".to_string()).unwrap(),
                email: EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                password: Password::new(ADMIN_PASSWORD.to_string()).unwrap(),
                phone: None,
                address: None,
            })
            .await
            .expect("Failed to seed administrator");

        let router = create_router(account_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            authenticator,
            repository,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }

    /// Register an account and return its token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/auth/register")
            .json(&json!({
                "name": "Test Account",
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    /// Log in and return the token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    /// Token for the seeded administrator
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}
