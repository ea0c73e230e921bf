//! HTTP and `WebSocket` API for the Groupboard session service.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** for reading the session and for the join, remove,
//!   create, reconfigure, and reset operations
//! - **`WebSocket` endpoint** (`/ws/session`) pushing the full session on
//!   connect and after every accepted mutation
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers are thin: they decode the request, call one
//! [`SessionStore`] operation, and encode the result. The store owns
//! locking and publication; each `WebSocket` connection is one observer
//! [`Subscription`] that forwards snapshots as `session_update` frames.
//!
//! [`SessionStore`]: groupboard_core::SessionStore
//! [`Subscription`]: groupboard_core::Subscription

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_server};
pub use state::AppState;
