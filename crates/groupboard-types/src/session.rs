//! Session snapshot structs and the real-time push envelope.
//!
//! A [`Session`] value is always a complete, self-contained copy of the
//! session state. The store hands these out and observers replace whatever
//! they held with each one they receive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{GroupId, MemberId, SessionId};

/// Event name carried by every real-time push.
pub const SESSION_UPDATE_EVENT: &str = "session_update";

/// Display name for the group at 0-based position `index`.
///
/// Groups are named by ordinal: the first group is `Group 1`.
pub fn group_name(index: usize) -> String {
    format!("Group {}", index.saturating_add(1))
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A participant who joined a group by name.
///
/// Members are immutable once created; there is no rename or move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Member {
    /// Identifier generated on join.
    pub id: MemberId,
    /// Display name exactly as supplied by the participant.
    pub name: String,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Create a member with a fresh identifier, joined now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            joined_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named, capacity-bounded container of members.
///
/// `members` is kept in join order; `members.len() <= capacity` holds after
/// every store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Group {
    /// Identifier, stable for the group's lifetime.
    pub id: GroupId,
    /// Positional display name (`Group 1`, `Group 2`, ...).
    pub name: String,
    /// Maximum number of members.
    pub capacity: usize,
    /// Members in join order.
    pub members: Vec<Member>,
}

impl Group {
    /// Create an empty group for position `index` with the given capacity.
    pub fn empty(index: usize, capacity: usize) -> Self {
        Self {
            id: GroupId::new(),
            name: group_name(index),
            capacity,
            members: Vec::new(),
        }
    }

    /// Whether the group has no free seats left.
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// Number of free seats.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.members.len())
    }

    /// Whether a member with exactly this name (case-sensitive) is present.
    pub fn has_member_named(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The single live collection of groups.
///
/// `revision` increases with every state change and keeps increasing across
/// session recreation, so observers can discard stale or repeated pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Session {
    /// Identifier, fresh for every created session.
    pub id: SessionId,
    /// Store-wide monotonic state revision.
    #[ts(type = "number")]
    pub revision: u64,
    /// When this session was created.
    pub created_at: DateTime<Utc>,
    /// Groups in display order.
    pub groups: Vec<Group>,
}

impl Session {
    /// An empty session with no groups, as served before any admin setup.
    pub fn empty(revision: u64) -> Self {
        Self {
            id: SessionId::new(),
            revision,
            created_at: Utc::now(),
            groups: Vec::new(),
        }
    }

    /// Look up a group by id for mutation.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Total number of members across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Requested shape of the session: how many groups and how many seats each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Number of groups.
    pub group_count: usize,
    /// Capacity applied to every group.
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// Push envelope
// ---------------------------------------------------------------------------

/// Real-time push: a full-state replacement under the `session_update` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionUpdate {
    /// Always [`SESSION_UPDATE_EVENT`].
    pub event: String,
    /// The complete session state.
    pub data: Session,
}

/// Borrowing twin of [`SessionUpdate`] so encoding never clones a snapshot.
#[derive(Serialize)]
struct SessionUpdateRef<'a> {
    event: &'static str,
    data: &'a Session,
}

impl SessionUpdate {
    /// Encode a push frame for `session` as JSON text.
    pub fn encode(session: &Session) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SessionUpdateRef {
            event: SESSION_UPDATE_EVENT,
            data: session,
        })
    }
}
