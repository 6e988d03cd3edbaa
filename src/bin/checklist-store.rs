//! # Checklist Store
//!
//! Standalone process that brings up the task store (database pool, migrations,
//! cache shards), reports its health and holds the connections until shutdown.
//! Transport adapters embed [`StoreContext`] instead of running this binary.
//!
//! ## Usage
//!
//! ```bash
//! checklist-store --config config/checklist-store.toml
//! CHECKLIST__CACHE__ENABLED=true CHECKLIST__CACHE__ENDPOINTS=redis-0:6379,redis-1:6379 checklist-store
//! checklist-store --check-config
//! ```

use anyhow::{Context, Result};
use checklist_store::bootstrap::StoreContext;
use checklist_store::config::ConfigLoader;
use checklist_store::logging;
use checklist_store::observability::TracingObserver;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "checklist-store")]
#[command(about = "Run the task store with its sharded cache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (default: $CHECKLIST_CONFIG_PATH or config/checklist-store.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Apply embedded migrations before serving
    #[arg(long)]
    migrate: bool,

    /// Load and validate configuration, print it with secrets redacted, then exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_file(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader
        .load()
        .with_context(|| format!("Failed to load configuration from {}", loader.file().display()))?;

    if cli.migrate {
        config.database.run_migrations = true;
    }

    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&config.sanitized())?);
        return Ok(());
    }

    logging::init_structured_logging(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = %loader.file().display(),
        "Starting checklist store"
    );

    let store = StoreContext::initialize(&config, TracingObserver::shared())
        .await
        .context("Failed to initialize task store")?;

    let health = store.health_service().health().await;
    if health.is_healthy() {
        info!(
            database = ?health.database,
            cache = ?health.cache,
            duration_ms = health.duration_ms,
            "Health check passed"
        );
    } else {
        warn!(
            database = ?health.database,
            cache = ?health.cache,
            duration_ms = health.duration_ms,
            "Health check reported problems"
        );
    }

    info!("Press Ctrl+C to shut down");
    shutdown_signal().await;

    info!("Shutdown signal received");
    store.shutdown().await;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
