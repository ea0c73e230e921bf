//! Broadcast hub: fan-out of full session snapshots to observers.
//!
//! The hub is a registry of observer handles, each backed by an unbounded
//! channel. Publishing walks the registry and hands every observer the same
//! [`Arc`]'d snapshot without waiting on any of them, so there is no
//! backpressure on the publisher. Observers whose receiving side is gone
//! are pruned on the next publish.
//!
//! Snapshots are published after the store releases its write lock, so two
//! publications can reach an observer out of order, and a subscriber may
//! see a snapshot it already got as its initial state. [`Subscription`]
//! filters both cases by revision, yielding a strictly increasing sequence.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use groupboard_types::{ObserverId, Session};
use tokio::sync::mpsc;
use tracing::debug;

type Registry = BTreeMap<ObserverId, mpsc::UnboundedSender<Arc<Session>>>;

#[derive(Debug, Default)]
struct HubInner {
    observers: Mutex<Registry>,
}

impl HubInner {
    fn observers(&self) -> MutexGuard<'_, Registry> {
        // Registry updates are single map operations, so a poisoned lock
        // still guards a consistent map.
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of connected observers.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer and queue `initial` as its first snapshot.
    ///
    /// The caller must make sure no mutation can complete between capturing
    /// `initial` and this call; [`crate::store::SessionStore::subscribe`]
    /// does so by holding the session read lock across both.
    pub fn subscribe(&self, initial: Arc<Session>) -> Subscription {
        let id = ObserverId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive in this scope, so the send cannot fail.
        let _ = tx.send(initial);
        self.inner.observers().insert(id, tx);
        debug!(observer = %id, "observer subscribed");

        Subscription {
            id,
            rx,
            last_revision: None,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove an observer from future broadcasts.
    ///
    /// Returns whether it was registered. Unknown or already removed ids are
    /// a no-op.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let removed = self.inner.observers().remove(&id).is_some();
        if removed {
            debug!(observer = %id, "observer unsubscribed");
        }
        removed
    }

    /// Deliver `snapshot` to every registered observer.
    ///
    /// Returns the number of observers it was queued for. Observers whose
    /// receiver has been dropped are removed; delivery failures are never
    /// reported to the caller.
    pub fn publish(&self, snapshot: &Arc<Session>) -> usize {
        let mut observers = self.inner.observers();
        let before = observers.len();
        observers.retain(|_, tx| tx.send(Arc::clone(snapshot)).is_ok());
        let delivered = observers.len();
        drop(observers);

        let pruned = before.saturating_sub(delivered);
        if pruned > 0 {
            debug!(pruned, "pruned disconnected observers");
        }
        debug!(revision = snapshot.revision, delivered, "published session snapshot");
        delivered
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers().len()
    }

    /// Whether `id` is currently registered.
    pub fn is_subscribed(&self, id: ObserverId) -> bool {
        self.inner.observers().contains_key(&id)
    }
}

/// Receiving side of one observer's registration.
///
/// Dropping the subscription unregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: ObserverId,
    rx: mpsc::UnboundedReceiver<Arc<Session>>,
    last_revision: Option<u64>,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// This observer's registry id.
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Revision of the last snapshot yielded, if any.
    pub const fn last_revision(&self) -> Option<u64> {
        self.last_revision
    }

    /// Wait for the next snapshot newer than the last one yielded.
    ///
    /// The first call returns the snapshot captured at subscribe time.
    /// Returns `None` once the observer has been unsubscribed and its queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<Arc<Session>> {
        loop {
            let snapshot = self.rx.recv().await?;
            if self.accept(&snapshot) {
                return Some(snapshot);
            }
        }
    }

    /// Return the next queued snapshot newer than the last one yielded,
    /// without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Session>> {
        while let Ok(snapshot) = self.rx.try_recv() {
            if self.accept(&snapshot) {
                return Some(snapshot);
            }
        }
        None
    }

    /// Drain everything queued and return the newest snapshot, if any is
    /// newer than the last one yielded.
    pub fn latest(&mut self) -> Option<Arc<Session>> {
        let mut newest = None;
        while let Some(snapshot) = self.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    fn accept(&mut self, snapshot: &Session) -> bool {
        if self
            .last_revision
            .is_some_and(|last| snapshot.revision <= last)
        {
            debug!(
                observer = %self.id,
                revision = snapshot.revision,
                "skipping stale snapshot"
            );
            return false;
        }
        self.last_revision = Some(snapshot.revision);
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.observers().remove(&self.id);
        }
    }
}
