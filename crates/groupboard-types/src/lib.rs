//! Shared type definitions for the Groupboard session service.
//!
//! Everything a consumer of the session sees on the wire lives here: the
//! identifier newtypes, the snapshot structs pushed to observers, and the
//! push envelope. Types flow to `TypeScript` via `ts-rs` for the browser
//! client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions, groups, and members
//! - [`session`] -- Snapshot structs (`Session`, `Group`, `Member`) and the
//!   `session_update` push envelope

pub mod ids;
pub mod session;

pub use ids::{GroupId, MemberId, ObserverId, SessionId};
pub use session::{
    Group, Member, SESSION_UPDATE_EVENT, Session, SessionSettings, SessionUpdate, group_name,
};
