//! Marine & Travel Quoting - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (in-memory store)
//! cargo run --bin quoting-api
//!
//! # Persist to a JSON document
//! API_STORE__BACKEND=file API_STORE__PATH=data/store.json cargo run --bin quoting-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_SESSION_TTL_HOURS` - Session and token lifetime (default: 24)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_TIMEZONE` - Timezone for date rules (default: Africa/Nairobi)
//! * `API_STORE__BACKEND` - memory, file or postgres (default: memory)
//! * `API_STORE__PATH` - Document path for the file backend
//! * `API_STORE__DATABASE_URL` - PostgreSQL connection string
//! * `API_PAYMENT__TIMEOUT_SECS` - Upper bound on a payment (default: 60)
//! * `API_PAYMENT__SIMULATED_DELAY_MS` - Simulated gateway latency (default: 1500)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{KeyValueStore, SystemClock};
use domain_billing::SimulatedGateway;
use infra_db::{create_pool, DatabaseConfig, FileKeyValueStore, InMemoryKeyValueStore, PostgresKeyValueStore};
use interface_api::config::{ApiConfig, StoreBackend, StoreConfig};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::load().context("loading configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store.backend,
        "Starting quoting API server"
    );

    let store = open_store(&config.store).await?;
    let gateway = Arc::new(SimulatedGateway::new(config.payment.simulated_delay()));
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("parsing server address {}", config.server_addr()))?;

    let app = create_router(AppState::new(config, store, Arc::new(SystemClock), gateway));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await.context("binding listener")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens the configured key-value store
async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StoreBackend::File => {
            tracing::info!(path = %config.path.display(), "Using file store");
            Arc::new(FileKeyValueStore::new(&config.path))
        }
        StoreBackend::Postgres => {
            let pool = create_pool(DatabaseConfig::new(&config.database_url))
                .await
                .context("connecting to database")?;
            let store = PostgresKeyValueStore::new(pool);
            store.migrate().await.context("running migrations")?;
            tracing::info!("Database ready");
            Arc::new(store)
        }
    };
    Ok(store)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
