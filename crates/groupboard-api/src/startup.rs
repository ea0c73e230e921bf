//! Background server startup helper.
//!
//! Provides [`spawn_server`], which binds eagerly and then serves on a
//! background Tokio task. Binding before spawning means an unusable address
//! is reported to the caller instead of only being logged, and the caller
//! learns the actual port when it asked for port `0`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use groupboard_api::{spawn_server, AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::default());
//! let (addr, handle) = spawn_server(&ServerConfig::default(), state).await?;
//! // The server is now running on `addr`.
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve_listener};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}

/// Spawn the API server on a background Tokio task.
///
/// Returns the bound address and a [`JoinHandle`]. The server runs until
/// the task is aborted or the runtime shuts down.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError> {
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve_listener(listener, state, std::future::pending()).await {
            tracing::error!(error = %e, "Groupboard server exited with error");
        }
    });

    tracing::info!(%addr, "Groupboard server spawned on background task");

    Ok((addr, handle))
}
