use std::env;
use std::fmt;

use auth::HashCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::account::errors::ValidationErrors;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Credential store settings. Without a URL accounts live in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_http_port")]
    pub http_port: u16,
}

impl ServerConfig {
    fn default_http_port() -> u16 {
        8080
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: Self::default_http_port(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "JwtConfig::default_ttl_seconds")]
    pub ttl_seconds: i64,
}

impl JwtConfig {
    fn default_ttl_seconds() -> i64 {
        3600
    }

    /// Token lifetime, `None` when `ttl_seconds` does not fit a duration.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_seconds(self.ttl_seconds)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl From<PasswordConfig> for HashCost {
    fn from(config: PasswordConfig) -> Self {
        HashCost {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

/// Optional administrator seeded at startup.
#[derive(Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl BootstrapConfig {
    /// Registration command for the configured administrator, if both email
    /// and password are set.
    ///
    /// # Errors
    /// Field errors when the configured values break the registration rules
    pub fn admin_command(&self) -> Result<Option<RegisterCommand>, ValidationErrors> {
        let (Some(email), Some(password)) = (&self.admin_email, &self.admin_password) else {
            return Ok(None);
        };

        let mut errors = ValidationErrors::new();
        let email = errors.check("bootstrap.admin_email", EmailAddress::new(email.clone()));
        let password = errors.check("bootstrap.admin_password", Password::new(password.clone()));
        let name = errors.check(
            "bootstrap.admin_name",
            DisplayName::new(
                self.admin_name
                    .clone()
                    .unwrap_or_else(|| "Administrator".to_string()),
            ),
        );

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) => Ok(Some(RegisterCommand {
                name,
                email,
                password,
                phone: None,
                address: None,
            })),
            _ => Err(errors),
        }
    }
}

impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("admin_name", &self.admin_name)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
