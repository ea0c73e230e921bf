//! Shared application state for the API server.
//!
//! [`AppState`] holds the session store. The store in turn owns the
//! broadcast hub, so handlers and `WebSocket` connections reach both
//! through one handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use groupboard_core::{LimitsConfig, SessionStore, Subscription};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single authoritative session store.
    pub store: Arc<SessionStore>,
    /// When this server process started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state with an empty session.
    pub fn new(limits: LimitsConfig) -> Self {
        Self::with_store(Arc::new(SessionStore::new(limits)))
    }

    /// Create an application state around an existing store.
    pub fn with_store(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }

    /// Register a new observer with the store's broadcast hub.
    pub async fn subscribe(&self) -> Subscription {
        self.store.subscribe().await
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.store.hub().observer_count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}
