//! The session store: single owner of the live session.
//!
//! All mutating operations serialize on one write lock. Within it they
//! validate, mutate, bump the revision, check invariants, and capture a
//! snapshot; the snapshot is published to the [`BroadcastHub`] only after
//! the lock is released. Every successful mutation publishes, including a
//! removal that found nothing to remove. Reads clone out a snapshot under
//! the read lock.
//!
//! [`tokio::sync::RwLock`] queues waiters fairly, so a steady stream of
//! writes cannot starve readers and vice versa.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use groupboard_types::{GroupId, Member, MemberId, Session, SessionId, SessionSettings};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::LimitsConfig;
use crate::error::SessionError;
use crate::hub::{BroadcastHub, Subscription};
use crate::rules;

/// Owner of the single live session.
#[derive(Debug)]
pub struct SessionStore {
    session: RwLock<Session>,
    hub: BroadcastHub,
    limits: LimitsConfig,
}

impl SessionStore {
    /// Create a store holding an empty session (no groups).
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            session: RwLock::new(Session::empty(0)),
            hub: BroadcastHub::new(),
            limits,
        }
    }

    /// The hub observers are registered with.
    pub const fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// The input limits this store enforces.
    pub const fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Return a copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Current revision without copying the session.
    pub async fn revision(&self) -> u64 {
        self.session.read().await.revision
    }

    /// Register an observer whose first received snapshot is the state at
    /// this instant.
    ///
    /// The read lock is held across capture and registration, so every
    /// mutation either happened before the initial snapshot or will be
    /// published to the new observer.
    pub async fn subscribe(&self) -> Subscription {
        let session = self.session.read().await;
        let initial = Arc::new(session.clone());
        let subscription = self.hub.subscribe(initial);
        drop(session);
        subscription
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Discard the current session and build a fresh one of
    /// `group_count` empty groups.
    pub async fn create_session(&self, settings: SessionSettings) -> Result<Session, SessionError> {
        rules::validate_settings(settings, &self.limits)?;

        let (previous, snapshot) = self
            .commit(|session| {
                let previous = session.id;
                session.id = SessionId::new();
                session.created_at = Utc::now();
                session.groups = rules::build_groups(settings);
                Ok::<_, SessionError>(previous)
            })
            .await?;

        info!(
            previous_session = %previous,
            session = %snapshot.id,
            group_count = settings.group_count,
            capacity = settings.capacity,
            revision = snapshot.revision,
            "session created"
        );
        Ok(Arc::unwrap_or_clone(snapshot))
    }

    /// Add `name` to the group, returning the new member.
    ///
    /// Fails with `GroupNotFound`, `NameTaken`, or `GroupFull`, checked in
    /// that order.
    pub async fn join(&self, group_id: GroupId, name: &str) -> Result<Member, SessionError> {
        rules::validate_name(name, &self.limits)?;

        let (member, snapshot) = self
            .commit(|session| {
                let index = rules::check_join(session, group_id, name)?;
                let group = session
                    .groups
                    .get_mut(index)
                    .ok_or_else(|| SessionError::GroupNotFound(group_id.to_string()))?;
                let member = Member::new(name);
                group.members.push(member.clone());
                Ok::<_, SessionError>(member)
            })
            .await?;

        info!(
            group = %group_id,
            member = %member.id,
            revision = snapshot.revision,
            "member joined"
        );
        Ok(member)
    }

    /// Remove a member from a group.
    ///
    /// Fails only if the group does not exist. Removing a member that is not
    /// in the group succeeds without changing membership, but still bumps the
    /// revision and publishes. Returns whether a member was removed.
    pub async fn remove_member(
        &self,
        group_id: GroupId,
        member_id: MemberId,
    ) -> Result<bool, SessionError> {
        let (removed, snapshot) = self
            .commit(|session| {
                let group = session
                    .group_mut(group_id)
                    .ok_or_else(|| SessionError::GroupNotFound(group_id.to_string()))?;
                let before = group.members.len();
                group.members.retain(|m| m.id != member_id);
                Ok::<_, SessionError>(group.members.len() != before)
            })
            .await?;

        if removed {
            info!(
                group = %group_id,
                member = %member_id,
                revision = snapshot.revision,
                "member removed"
            );
        } else {
            debug!(
                group = %group_id,
                member = %member_id,
                revision = snapshot.revision,
                "member already absent"
            );
        }
        Ok(removed)
    }

    /// Reshape the session to `group_count` groups of `capacity`, keeping
    /// existing groups and their earliest joiners.
    pub async fn update_settings(
        &self,
        settings: SessionSettings,
    ) -> Result<Session, SessionError> {
        rules::validate_settings(settings, &self.limits)?;

        let ((evicted, discarded), snapshot) = self
            .commit(|session| {
                let current = std::mem::take(&mut session.groups);
                let outcome = rules::reconcile(current, settings);
                session.groups = outcome.groups;
                Ok::<_, SessionError>((outcome.evicted.len(), outcome.discarded.len()))
            })
            .await?;

        info!(
            group_count = settings.group_count,
            capacity = settings.capacity,
            evicted,
            discarded_groups = discarded,
            revision = snapshot.revision,
            "session settings updated"
        );
        Ok(Arc::unwrap_or_clone(snapshot))
    }

    /// Empty every group, keeping groups, ids, names, and capacities.
    pub async fn reset_members(&self) -> Session {
        let Ok((cleared, snapshot)) = self
            .commit(|session| {
                let cleared = session.member_count();
                for group in &mut session.groups {
                    group.members.clear();
                }
                Ok::<_, Infallible>(cleared)
            })
            .await;

        info!(cleared, revision = snapshot.revision, "members reset");
        Arc::unwrap_or_clone(snapshot)
    }

    /// Run `mutate` under the write lock, then bump the revision and publish.
    ///
    /// A closure error leaves the revision untouched and publishes nothing.
    /// Returns the closure's value and the published snapshot.
    async fn commit<T, E, F>(&self, mutate: F) -> Result<(T, Arc<Session>), E>
    where
        F: FnOnce(&mut Session) -> Result<T, E>,
    {
        let mut session = self.session.write().await;
        let value = mutate(&mut *session)?;
        session.revision = session.revision.saturating_add(1);
        rules::assert_invariants(&session);
        let snapshot = Arc::new(session.clone());
        drop(session);

        self.hub.publish(&snapshot);
        Ok((value, snapshot))
    }
}
