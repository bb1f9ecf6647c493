//! # Taskboard API Server
//!
//! Serves the task tracker over HTTP: registration, token issuance, tasks,
//! comments and paged listings.
//!
//! ## Usage
//!
//! ```bash
//! # PostgreSQL (default)
//! DATABASE_URL=postgresql://localhost/taskboard JWT_SECRET=... cargo run -p taskboard-api
//!
//! # Throwaway in-memory store
//! STORAGE=memory JWT_SECRET=... cargo run -p taskboard-api
//! ```

use sqlx::PgPool;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageBackend},
};
use taskboard_shared::{
    db::{migrations, pool},
    store::{memory::InMemoryStore, postgres::PgStore, Storage},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = ?config.storage,
        "Taskboard API server starting"
    );

    let (store, db) = open_store(&config).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        pool::close_pool(db).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()
    });

    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Opens the configured store, returning the pool when there is one to close
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn Storage>, Option<PgPool>)> {
    match (config.storage, &config.database) {
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
        (StorageBackend::Postgres, Some(database)) => {
            migrations::ensure_database_exists(&database.url).await?;

            let db = pool::create_pool(database.pool_config()).await?;
            migrations::run_migrations(&db).await?;

            Ok((Arc::new(PgStore::new(db.clone())), Some(db)))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("PostgreSQL storage selected without a database configuration")
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
