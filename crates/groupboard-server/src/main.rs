//! Groupboard server binary.
//!
//! Wires configuration, logging, the session store, and the HTTP +
//! `WebSocket` API together, then serves until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `groupboard-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the session store and application state
//! 4. Serve until Ctrl-C, then shut down gracefully

mod error;

use std::path::Path;
use std::sync::Arc;

use groupboard_api::{AppState, ServerConfig, start_server};
use groupboard_core::{GroupboardConfig, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "groupboard-config.yaml";

/// Application entry point.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration. Logging is not up yet, so note where it came from.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        host = config.server.host,
        port = config.server.port,
        from_file,
        max_group_count = config.limits.max_group_count,
        max_capacity = config.limits.max_capacity,
        max_name_len = config.limits.max_name_len,
        "Configuration loaded"
    );

    // 3. Create application state around an empty session.
    let state = Arc::new(AppState::new(config.limits));

    // 4. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    start_server(&server_config, state, shutdown_signal()).await?;

    info!("groupboard-server shutdown complete");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults when
/// the file does not exist.
///
/// Returns the configuration and whether it came from the file.
fn load_config() -> Result<(GroupboardConfig, bool), AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((GroupboardConfig::from_file(config_path)?, true))
    } else {
        Ok((GroupboardConfig::parse("")?, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}
