use std::sync::Arc;

use anyhow::Context;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::SigningKey;
use identity_service::account::ports::AccountServicePort;
use identity_service::account::service::AccountService;
use identity_service::config::Config;
use identity_service::inbound::http::router::create_router;
use identity_service::repositories::InMemoryCredentialRepository;
use identity_service::repositories::PostgresCredentialRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load().context("Failed to load configuration")?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.ttl_seconds,
        persistent_store = config.database.url.is_some(),
        "Configuration loaded"
    );

    // A missing or short secret is fatal
    let signing_key = Arc::new(
        SigningKey::from_secret(config.jwt.secret.as_bytes())
            .context("Invalid jwt.secret")?,
    );
    let token_ttl = config
        .jwt
        .token_ttl()
        .context("jwt.ttl_seconds is out of range")?;
    let password_hasher =
        PasswordHasher::with_cost(config.password.into()).context("Invalid password cost")?;
    let authenticator = Arc::new(
        Authenticator::new(signing_key, token_ttl, password_hasher)
            .context("Invalid token settings")?,
    );

    let account_service: Arc<dyn AccountServicePort> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await
                .context("Failed to connect to the credential store")?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let repository = Arc::new(PostgresCredentialRepository::new(pg_pool));
            Arc::new(AccountService::new(repository, Arc::clone(&authenticator)))
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            let repository = Arc::new(InMemoryCredentialRepository::new());
            Arc::new(AccountService::new(repository, Arc::clone(&authenticator)))
        }
    };

    if let Some(command) = config
        .bootstrap
        .admin_command()
        .map_err(|errors| anyhow::anyhow!("Invalid bootstrap settings: {}", errors))?
    {
        let admin = account_service.bootstrap_admin(command).await?;
        tracing::info!(subject = %admin.email, "Administrator account ready");
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service, authenticator);
    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
