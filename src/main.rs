use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod domains;
mod routes;
mod shared;
mod system;
#[cfg(test)]
mod test_support;

use shared::state::{AppState, Stores};
use system::{config::AppConfig, database::DatabaseService};

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // RUST_LOG, when set, overrides LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()
        .context("Failed to build async runtime")?
        .block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<()> {
    info!(
        environment = %config.environment,
        log_level = %config.log.level,
        "Configuration loaded"
    );

    let (stores, database) = match &config.database {
        Some(db_config) => {
            let database = DatabaseService::connect(db_config).await?;
            (database.stores().await?, Some(database))
        }
        None => {
            warn!("No database configured; using in-memory storage, data is lost on restart");
            (Stores::in_memory(), None)
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, stores, database)?);
    let app = routes::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, storage = state.storage(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(database) = state.database.clone() {
        database.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
