//! Error taxonomy for session operations.
//!
//! Every variant is a client-input error reported synchronously to the
//! caller. Internal invariant violations are not represented here; they
//! abort (see [`crate::rules::assert_invariants`]).

/// Coarse classification of a [`SessionError`], used by transports to pick
/// a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing required input.
    InvalidArgument,
    /// The referenced group does not exist.
    NotFound,
    /// The name is already taken within the group.
    Conflict,
    /// The group is at capacity.
    Full,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Full => "full",
        }
    }
}

/// Errors returned by [`crate::store::SessionStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A required field was missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No group with this id exists in the current session.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// A member with the same name is already in the group.
    #[error("name '{name}' is already registered in this group")]
    NameTaken {
        /// The conflicting name.
        name: String,
    },

    /// The group has no free seats.
    #[error("group is full (capacity {capacity})")]
    GroupFull {
        /// The group's capacity.
        capacity: usize,
    },
}

impl SessionError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::GroupNotFound(_) => ErrorKind::NotFound,
            Self::NameTaken { .. } => ErrorKind::Conflict,
            Self::GroupFull { .. } => ErrorKind::Full,
        }
    }

    /// Shorthand for an [`SessionError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_codes() {
        assert_eq!(SessionError::invalid("x").kind().code(), "invalid_argument");
        assert_eq!(
            SessionError::GroupNotFound(String::from("g")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SessionError::NameTaken { name: String::from("Alice") }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(SessionError::GroupFull { capacity: 2 }.kind().code(), "full");
    }

    #[test]
    fn messages_name_the_problem() {
        let err = SessionError::NameTaken { name: String::from("Alice") };
        assert!(err.to_string().contains("Alice"));
        assert_eq!(
            SessionError::GroupFull { capacity: 3 }.to_string(),
            "group is full (capacity 3)"
        );
    }
}
