//! Session state machine for the Groupboard service.
//!
//! One live session of capacity-bounded groups, mutated by concurrent
//! join/remove/reconfigure requests and mirrored to every connected
//! observer.
//!
//! # Architecture
//!
//! - [`store::SessionStore`] owns the session behind a [`tokio::sync::RwLock`].
//!   Every mutation runs its validation, state change, and snapshot capture
//!   under the write lock; readers clone out snapshots under the read lock.
//! - [`rules`] holds the pure decision logic the store applies under that
//!   lock: argument validation, join admissibility, and reconfiguration
//!   reconciliation.
//! - [`hub::BroadcastHub`] is the observer registry. The store publishes to
//!   it after releasing the write lock, so a slow observer never extends a
//!   critical section.
//! - [`config`] loads `groupboard-config.yaml`.

pub mod config;
pub mod error;
pub mod hub;
pub mod rules;
pub mod store;

pub use config::{ConfigError, GroupboardConfig, LimitsConfig, ListenConfig, LoggingConfig};
pub use error::{ErrorKind, SessionError};
pub use hub::{BroadcastHub, Subscription};
pub use store::SessionStore;
