//! Quote Server Entry Point
//!
//! Uses `anyhow` for startup errors (config, database, bind). Request-level
//! errors stay inside `pow` and are answered on the wire.

mod config;

use anyhow::Context;
use config::ServerConfig;
use pow::store::{MemoryStore, PgStore, SeedRepository};
use pow::{DifficultyController, Listener, StaticQuotes, pow_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_server=info,pow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    match config.database_url.clone() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("connecting to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            // Errors here should not prevent server startup
            let store = PgStore::new(pool);
            if let Err(e) = store.cleanup_expired().await {
                tracing::warn!(error = %e, "Seed cleanup failed, continuing anyway");
            }

            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, seeds are kept in memory");
            serve(config, MemoryStore::new()).await
        }
    }
}

async fn serve<R>(config: ServerConfig, store: R) -> anyhow::Result<()>
where
    R: SeedRepository + Send + Sync + 'static,
{
    let listener = Listener::bind(config.network_address.as_str(), config.listener.clone())
        .await
        .with_context(|| format!("binding {}", config.network_address))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        target_rps = config.pow.target_rps,
        bits_min = config.pow.bits.min,
        bits_max = config.pow.bits.max,
        "Server listening"
    );

    let (difficulty, controller) = DifficultyController::spawn(&config.pow);
    let router = pow_router(store, difficulty, StaticQuotes::default(), config.pow);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let server = tokio::spawn(listener.serve(Arc::new(router), shutdown_rx));

    wait_for_signal().await;
    let _ = shutdown_tx.send(());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Listener task failed");
    }
    controller.stop().await;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
