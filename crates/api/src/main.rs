//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use booking_store::{
    CatalogFixtures, InMemoryBookingRepository, InMemoryCatalog, PostgresBookingRepository,
    PostgresCatalog,
};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn postgres_state(config: &Config, url: &str) -> Arc<api::routes::bookings::AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .expect("failed to connect to database");

    let bookings = PostgresBookingRepository::new(pool.clone());
    bookings
        .run_migrations()
        .await
        .expect("failed to run migrations");
    let catalog = Arc::new(PostgresCatalog::new(pool));

    tracing::info!(
        max_connections = config.database_max_connections,
        "using PostgreSQL stores"
    );
    api::create_default_state(Arc::new(bookings), catalog.clone(), catalog)
}

async fn in_memory_state(config: &Config) -> Arc<api::routes::bookings::AppState> {
    let catalog = InMemoryCatalog::new();
    if let Some(path) = &config.catalog_fixtures {
        let raw = std::fs::read_to_string(path).expect("failed to read catalog fixtures");
        let fixtures: CatalogFixtures =
            serde_json::from_str(&raw).expect("failed to parse catalog fixtures");
        tracing::info!(
            path = %path.display(),
            users = fixtures.users.len(),
            items = fixtures.items.len(),
            "loading catalog fixtures"
        );
        catalog.load_fixtures(fixtures).await;
    }

    tracing::info!("using in-memory stores");
    api::create_default_state(
        Arc::new(InMemoryBookingRepository::new()),
        Arc::new(catalog.clone()),
        Arc::new(catalog),
    )
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Create stores and application state
    let state = match &config.database_url {
        Some(url) => postgres_state(&config, url).await,
        None => in_memory_state(&config).await,
    };

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
