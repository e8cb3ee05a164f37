//! # Niaga API server
//!
//! ## Usage
//! ```bash
//! cargo run -p niaga-api
//!
//! # Explicit config file
//! cargo run -p niaga-api -- --config ./niaga.toml
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use niaga_api::{build_router, init_tracing, ApiConfig, AppState};
use niaga_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Niaga API server...");

    let config_path = parse_config_arg();
    let config = ApiConfig::load(config_path).context("loading configuration")?;

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    info!(
        addr = %config.server.bind_address(),
        db = %db_path.display(),
        due_days = config.sales.due_days,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&db_path).max_connections(config.database.max_connections),
    )
    .await
    .with_context(|| format!("opening database {}", db_path.display()))?;

    let bind_addr = config.server.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `--config <path>` / `-c <path>`; anything else is ignored.
fn parse_config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => return args.next().map(PathBuf::from),
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
    }
    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
