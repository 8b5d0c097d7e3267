use std::sync::Arc;

use auth::Authenticator;
use auth::SecretProvider;
use booking_service::config::Config;
use booking_service::config::StorageBackend;
use booking_service::domain::user::ports::UserRepository;
use booking_service::domain::user::ports::UserServicePort;
use booking_service::domain::user::service::UserService;
use booking_service::inbound::http::router::create_router;
use booking_service::outbound::repositories::InMemoryUserRepository;
use booking_service::outbound::repositories::PostgresUserRepository;
use booking_service::outbound::sessions::InMemorySessionStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static SECRETS: SecretProvider = SecretProvider::new();

fn build_service<UR: UserRepository>(
    repository: UR,
    authenticator: &Arc<Authenticator>,
    config: &Config,
) -> Arc<dyn UserServicePort> {
    let sessions = config
        .auth
        .session_tracking
        .then(|| Arc::new(InMemorySessionStore::new()));

    Arc::new(UserService::new(
        Arc::new(repository),
        sessions,
        Arc::clone(authenticator),
        config.storage.timeout(),
    ))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "booking-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        storage_backend = ?config.storage.backend,
        auth_mode = ?config.auth.mode,
        session_tracking = config.auth.session_tracking,
        "Configuration loaded"
    );

    // A missing or short secret must stop the service before it serves anything.
    let signing_key = SECRETS
        .initialize(|| config.jwt.secret.clone())
        .inspect_err(|e| tracing::error!(error = %e, "Signing secret rejected"))?;

    let authenticator = Arc::new(Authenticator::configured(
        &signing_key,
        config.password.cost(),
        config.jwt.ttl(),
    )?);

    let user_service = match config.storage.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            build_service(PostgresUserRepository::new(pg_pool), &authenticator, &config)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            build_service(InMemoryUserRepository::new(), &authenticator, &config)
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator, config.auth.mode);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
