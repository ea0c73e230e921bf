//! Membership rules: pure decision logic applied by the session store.
//!
//! Nothing here owns state. The store calls these functions while it holds
//! exclusive access to the session, which is what makes a capacity check
//! and the append that follows it a single atomic step.

use std::collections::BTreeSet;

use groupboard_types::{Group, GroupId, Member, Session, SessionSettings};

use crate::config::LimitsConfig;
use crate::error::SessionError;

/// Validate a requested group count and capacity.
///
/// Both must be in `1..=max` for their respective limit.
pub fn validate_settings(
    settings: SessionSettings,
    limits: &LimitsConfig,
) -> Result<(), SessionError> {
    if settings.group_count == 0 {
        return Err(SessionError::invalid("groupCount must be a positive integer"));
    }
    if settings.capacity == 0 {
        return Err(SessionError::invalid("capacity must be a positive integer"));
    }
    if settings.group_count > limits.max_group_count {
        return Err(SessionError::invalid(format!(
            "groupCount must be at most {}",
            limits.max_group_count
        )));
    }
    if settings.capacity > limits.max_capacity {
        return Err(SessionError::invalid(format!(
            "capacity must be at most {}",
            limits.max_capacity
        )));
    }
    Ok(())
}

/// Validate a member display name.
///
/// The name must contain something other than whitespace and stay within
/// the configured length. It is stored as supplied, untrimmed.
pub fn validate_name(name: &str, limits: &LimitsConfig) -> Result<(), SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::invalid("name must not be empty"));
    }
    if name.chars().count() > limits.max_name_len {
        return Err(SessionError::invalid(format!(
            "name must be at most {} characters",
            limits.max_name_len
        )));
    }
    Ok(())
}

/// Decide whether `name` may join `group_id` right now.
///
/// Checks run in error-precedence order: existence, then name conflict,
/// then capacity. Returns the group's position on success.
pub fn check_join(session: &Session, group_id: GroupId, name: &str) -> Result<usize, SessionError> {
    let (index, group) = session
        .groups
        .iter()
        .enumerate()
        .find(|(_, g)| g.id == group_id)
        .ok_or_else(|| SessionError::GroupNotFound(group_id.to_string()))?;

    if group.has_member_named(name) {
        return Err(SessionError::NameTaken {
            name: name.to_owned(),
        });
    }
    if group.is_full() {
        return Err(SessionError::GroupFull {
            capacity: group.capacity,
        });
    }
    Ok(index)
}

/// Build `group_count` fresh, empty groups named by position.
pub fn build_groups(settings: SessionSettings) -> Vec<Group> {
    (0..settings.group_count)
        .map(|i| Group::empty(i, settings.capacity))
        .collect()
}

/// Outcome of reconciling the group list against new settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The new group list, exactly `group_count` long.
    pub groups: Vec<Group>,
    /// Members dropped by capacity truncation, with the group they left.
    pub evicted: Vec<(GroupId, Member)>,
    /// Groups discarded because they sat beyond the new count.
    pub discarded: Vec<Group>,
}

/// Map the current groups onto a new group count and capacity.
///
/// Position `i` below the current count keeps its id, name, and members,
/// takes the new capacity, and if it now holds too many members keeps only
/// the first `capacity` in join order (the most recent joiners go first).
/// Positions past the current count get new empty groups. Groups past the
/// new count are discarded along with their members.
pub fn reconcile(current: Vec<Group>, settings: SessionSettings) -> Reconciliation {
    let mut groups = Vec::with_capacity(settings.group_count);
    let mut evicted = Vec::new();
    let mut discarded = Vec::new();

    for (index, mut group) in current.into_iter().enumerate() {
        if index >= settings.group_count {
            discarded.push(group);
            continue;
        }
        if group.members.len() > settings.capacity {
            let dropped = group.members.split_off(settings.capacity);
            evicted.extend(dropped.into_iter().map(|m| (group.id, m)));
        }
        group.capacity = settings.capacity;
        groups.push(group);
    }

    for index in groups.len()..settings.group_count {
        groups.push(Group::empty(index, settings.capacity));
    }

    Reconciliation {
        groups,
        evicted,
        discarded,
    }
}

/// Abort if the session breaks a structural invariant.
///
/// A violation means a logic defect in the store, never bad client input,
/// so it is not reported as a [`SessionError`].
pub fn assert_invariants(session: &Session) {
    for group in &session.groups {
        assert!(
            group.members.len() <= group.capacity,
            "group {} holds {} members over capacity {}",
            group.id,
            group.members.len(),
            group.capacity
        );
        let ids: BTreeSet<_> = group.members.iter().map(|m| m.id).collect();
        assert!(
            ids.len() == group.members.len(),
            "group {} has duplicate member ids",
            group.id
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn settings(group_count: usize, capacity: usize) -> SessionSettings {
        SessionSettings {
            group_count,
            capacity,
        }
    }

    fn session_with(groups: Vec<Group>) -> Session {
        let mut session = Session::empty(0);
        session.groups = groups;
        session
    }

    fn group_of(index: usize, capacity: usize, names: &[&str]) -> Group {
        let mut group = Group::empty(index, capacity);
        group.members = names.iter().map(|n| Member::new(*n)).collect();
        group
    }

    #[test]
    fn zero_settings_are_rejected() {
        let limits = LimitsConfig::default();
        assert!(validate_settings(settings(0, 2), &limits).is_err());
        assert!(validate_settings(settings(2, 0), &limits).is_err());
        assert!(validate_settings(settings(1, 1), &limits).is_ok());
    }

    #[test]
    fn settings_above_limits_are_rejected() {
        let limits = LimitsConfig {
            max_group_count: 4,
            max_capacity: 10,
            max_name_len: 8,
        };
        assert!(validate_settings(settings(4, 10), &limits).is_ok());
        assert!(validate_settings(settings(5, 10), &limits).is_err());
        assert!(validate_settings(settings(4, 11), &limits).is_err());
    }

    #[test]
    fn blank_and_long_names_are_rejected() {
        let limits = LimitsConfig {
            max_name_len: 5,
            ..LimitsConfig::default()
        };
        assert!(validate_name("", &limits).is_err());
        assert!(validate_name("   ", &limits).is_err());
        assert!(validate_name("Alice", &limits).is_ok());
        assert!(validate_name("Alicia", &limits).is_err());
    }

    #[test]
    fn join_checks_existence_first() {
        let session = session_with(vec![group_of(0, 1, &["Alice"])]);
        let err = check_join(&session, GroupId::new(), "Alice").unwrap_err();
        assert!(matches!(err, SessionError::GroupNotFound(_)));
    }

    #[test]
    fn join_checks_name_before_capacity() {
        let session = session_with(vec![group_of(0, 1, &["Alice"])]);
        let id = session.groups[0].id;
        let err = check_join(&session, id, "Alice").unwrap_err();
        assert!(matches!(err, SessionError::NameTaken { .. }));

        let err = check_join(&session, id, "Bob").unwrap_err();
        assert_eq!(err, SessionError::GroupFull { capacity: 1 });
    }

    #[test]
    fn join_reports_group_position() {
        let session = session_with(vec![group_of(0, 2, &[]), group_of(1, 2, &["Alice"])]);
        let id = session.groups[1].id;
        assert_eq!(check_join(&session, id, "alice").unwrap(), 1);
    }

    #[test]
    fn build_groups_names_positionally() {
        let groups = build_groups(settings(3, 4));
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Group 1", "Group 2", "Group 3"]);
        assert!(groups.iter().all(|g| g.capacity == 4 && g.members.is_empty()));
    }

    #[test]
    fn shrinking_capacity_keeps_earliest_joiners() {
        let group = group_of(0, 5, &["a", "b", "c", "d", "e"]);
        let id = group.id;
        let out = reconcile(vec![group], settings(1, 3));

        let kept: Vec<_> = out.groups[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(kept, ["a", "b", "c"]);
        assert_eq!(out.groups[0].capacity, 3);
        assert_eq!(out.groups[0].id, id);

        let evicted: Vec<_> = out.evicted.iter().map(|(g, m)| (*g, m.name.as_str())).collect();
        assert_eq!(evicted, [(id, "d"), (id, "e")]);
    }

    #[test]
    fn growing_adds_empty_groups_after_existing() {
        let first = group_of(0, 2, &["a"]);
        let first_id = first.id;
        let out = reconcile(vec![first], settings(3, 4));

        assert_eq!(out.groups.len(), 3);
        assert_eq!(out.groups[0].id, first_id);
        assert_eq!(out.groups[0].members.len(), 1);
        assert_eq!(out.groups[0].capacity, 4);
        assert_eq!(out.groups[1].name, "Group 2");
        assert_eq!(out.groups[2].name, "Group 3");
        assert!(out.groups[2].members.is_empty());
        assert!(out.evicted.is_empty());
        assert!(out.discarded.is_empty());
    }

    #[test]
    fn shrinking_count_discards_trailing_groups() {
        let groups = vec![
            group_of(0, 2, &["a"]),
            group_of(1, 2, &["b"]),
            group_of(2, 2, &["c", "d"]),
        ];
        let third = groups[2].id;
        let out = reconcile(groups, settings(2, 2));

        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.discarded.len(), 1);
        assert_eq!(out.discarded[0].id, third);
        assert_eq!(out.discarded[0].members.len(), 2);
    }

    #[test]
    fn reconciled_sessions_hold_invariants() {
        let groups = vec![group_of(0, 6, &["a", "b", "c", "d", "e", "f"])];
        let out = reconcile(groups, settings(2, 1));
        assert_invariants(&session_with(out.groups));
    }

    #[test]
    #[should_panic(expected = "over capacity")]
    fn overfull_group_is_fatal() {
        let mut group = group_of(0, 1, &["a"]);
        group.members.push(Member::new("b"));
        assert_invariants(&session_with(vec![group]));
    }

    #[test]
    #[should_panic(expected = "duplicate member ids")]
    fn duplicate_member_ids_are_fatal() {
        let mut group = group_of(0, 3, &["a"]);
        let twin = group.members[0].clone();
        group.members.push(twin);
        assert_invariants(&session_with(vec![group]));
    }
}
