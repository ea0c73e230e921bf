//! Concurrency tests for the session store.
//!
//! These run on the multi-threaded runtime so joins, reconfigurations, and
//! subscriptions genuinely race for the session lock.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::sync::Arc;

use futures::future::join_all;
use groupboard_core::{ErrorKind, LimitsConfig, SessionStore};
use groupboard_types::{Session, SessionSettings};

fn settings(group_count: usize, capacity: usize) -> SessionSettings {
    SessionSettings {
        group_count,
        capacity,
    }
}

fn assert_within_capacity(session: &Session) {
    for group in &session.groups {
        assert!(group.members.len() <= group.capacity);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_joins_never_exceed_capacity() {
    let capacity = 5;
    let extra = 20;
    let store = Arc::new(SessionStore::new(LimitsConfig::default()));
    let session = store.create_session(settings(1, capacity)).await.unwrap();
    let group = session.groups[0].id;

    let tasks = (0..capacity + extra).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.join(group, &format!("member-{i}")).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let full = results
        .iter()
        .filter(|r| r.as_ref().is_err_and(|e| e.kind() == ErrorKind::Full))
        .count();
    assert_eq!(accepted, capacity);
    assert_eq!(full, extra);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.groups[0].members.len(), capacity);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_same_name_joins_admit_one() {
    let store = Arc::new(SessionStore::new(LimitsConfig::default()));
    let session = store.create_session(settings(1, 10)).await.unwrap();
    let group = session.groups[0].id;

    let tasks = (0..10).map(|_| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.join(group, "Alice").await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::Conflict)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn joins_racing_reconfiguration_keep_invariants() {
    let store = Arc::new(SessionStore::new(LimitsConfig::default()));
    let session = store.create_session(settings(3, 4)).await.unwrap();
    let groups: Vec<_> = session.groups.iter().map(|g| g.id).collect();

    let joins = (0..60).map(|i| {
        let store = Arc::clone(&store);
        let group = groups[i % groups.len()];
        tokio::spawn(async move {
            let _ = store.join(group, &format!("p{i}")).await;
            assert_within_capacity(&store.snapshot().await);
        })
    });
    let reconfigs = (1..=6).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store.update_settings(settings(i % 4 + 1, i % 3 + 1)).await.unwrap();
        })
    });

    for result in join_all(joins.chain(reconfigs)).await {
        result.unwrap();
    }
    assert_within_capacity(&store.snapshot().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn subscribers_converge_on_final_state() {
    let store = Arc::new(SessionStore::new(LimitsConfig::default()));
    let session = store.create_session(settings(2, 50)).await.unwrap();
    let groups: Vec<_> = session.groups.iter().map(|g| g.id).collect();

    let early = store.subscribe().await;

    let writers = (0..40).map(|i| {
        let store = Arc::clone(&store);
        let group = groups[i % 2];
        tokio::spawn(async move {
            store.join(group, &format!("w{i}")).await.unwrap();
        })
    });
    let late_subscribers = (0..5).map(|_| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.subscribe().await })
    });

    let (writer_results, late) = tokio::join!(join_all(writers), join_all(late_subscribers));
    for result in writer_results {
        result.unwrap();
    }
    let final_state = store.snapshot().await;

    let mut subscriptions: Vec<_> = late.into_iter().map(Result::unwrap).collect();
    subscriptions.push(early);

    for sub in &mut subscriptions {
        let mut last = None;
        while let Some(snapshot) = sub.try_recv() {
            if let Some(prev) = last {
                assert!(snapshot.revision > prev);
            }
            assert_within_capacity(&snapshot);
            last = Some(snapshot.revision);
        }
        assert_eq!(last, Some(final_state.revision));
        assert_eq!(sub.last_revision(), Some(final_state.revision));
    }
}
