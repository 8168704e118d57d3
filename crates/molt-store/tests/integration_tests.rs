//! Integration tests for molt-store
//!
//! These tests verify ingestion, eligibility selection and atomic commits
//! against a real SQLite database.

use molt_domain::traits::RecordStore;
use molt_domain::{PostId, PostRecord, PostState};
use molt_store::{SqliteStore, StoreError};
use std::collections::BTreeMap;
use std::time::Duration;

const DAY: u64 = 86_400;
const NOW: u64 = 1_700_000_000;

fn retention_days(days: u64) -> Duration {
    Duration::from_secs(days * DAY)
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().counts_by_state().unwrap().total(), 0);
}

#[test]
fn test_insert_and_get() {
    let mut store = SqliteStore::in_memory().unwrap();

    assert!(store.insert(PostId::new(1), 1000).unwrap());

    let record = store.get(PostId::new(1)).unwrap().expect("record should exist");
    assert_eq!(record, PostRecord::new(PostId::new(1), 1000));
    assert!(store.get(PostId::new(2)).unwrap().is_none());
}

#[test]
fn test_duplicate_insert_is_ignored() {
    let mut store = SqliteStore::in_memory().unwrap();

    assert!(store.insert(PostId::new(7), 1000).unwrap());
    // Same id, different timestamp and state: must not overwrite
    assert!(!store.insert(PostId::new(7), 5000).unwrap());
    assert!(!store
        .insert_with_state(PostId::new(7), 9000, PostState::ToKeep)
        .unwrap());

    let record = store.get(PostId::new(7)).unwrap().unwrap();
    assert_eq!(record.created_at, 1000);
    assert_eq!(record.state, PostState::ToDelete);
    assert_eq!(store.counts_by_state().unwrap().total(), 1);
}

#[test]
fn test_insert_batch_counts_new_records() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert(PostId::new(2), 200).unwrap();

    let batch = vec![
        (PostId::new(1), 100),
        (PostId::new(2), 999),
        (PostId::new(3), 300),
        (PostId::new(3), 300),
    ];
    assert_eq!(store.insert_batch(&batch).unwrap(), 2);
    assert_eq!(store.get(PostId::new(2)).unwrap().unwrap().created_at, 200);
    assert_eq!(store.counts_by_state().unwrap().get(PostState::ToDelete), 3);
}

#[test]
fn test_insert_rejects_unstorable_id() {
    let mut store = SqliteStore::in_memory().unwrap();
    let result = store.insert(PostId::new(u64::MAX), 1000);
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
}

#[test]
fn test_select_eligible_scenario() {
    let mut store = SqliteStore::in_memory().unwrap();
    let a = PostId::new(1);
    let b = PostId::new(2);
    store.insert(a, NOW - 100 * DAY).unwrap();
    store.insert(b, NOW - 10 * DAY).unwrap();

    let eligible = store.select_eligible(retention_days(25), NOW).unwrap();
    let ids: Vec<PostId> = eligible.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a]);
    assert_eq!(store.count_eligible(retention_days(25), NOW).unwrap(), 1);
}

#[test]
fn test_select_eligible_excludes_non_pending_states() {
    let mut store = SqliteStore::in_memory().unwrap();
    let old = NOW - 365 * DAY;
    store.insert(PostId::new(1), old).unwrap();
    store.insert_with_state(PostId::new(2), old, PostState::Deleted).unwrap();
    store.insert_with_state(PostId::new(3), old, PostState::ToKeep).unwrap();
    store.insert_with_state(PostId::new(4), old, PostState::CannotDelete).unwrap();

    let eligible = store.select_eligible(retention_days(25), NOW).unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, PostId::new(1));
}

#[test]
fn test_eligibility_cutoff_is_exclusive() {
    let mut store = SqliteStore::in_memory().unwrap();
    let cutoff = NOW - 25 * DAY;
    store.insert(PostId::new(1), cutoff).unwrap();
    store.insert(PostId::new(2), cutoff - 1).unwrap();

    let eligible = store.select_eligible(retention_days(25), NOW).unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, PostId::new(2));
}

#[test]
fn test_commit_transitions() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert(PostId::new(1), 100).unwrap();
    store.insert(PostId::new(2), 100).unwrap();
    store.insert(PostId::new(3), 100).unwrap();

    let mut transitions = BTreeMap::new();
    transitions.insert(PostId::new(1), PostState::Deleted);
    transitions.insert(PostId::new(2), PostState::CannotDelete);

    assert_eq!(store.commit_transitions(&transitions).unwrap(), 2);

    let counts = store.counts_by_state().unwrap();
    assert_eq!(counts.get(PostState::Deleted), 1);
    assert_eq!(counts.get(PostState::CannotDelete), 1);
    assert_eq!(counts.get(PostState::ToDelete), 1);
}

#[test]
fn test_commit_is_atomic_when_a_record_is_missing() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert(PostId::new(1), 100).unwrap();
    store.insert(PostId::new(2), 100).unwrap();

    // Ids commit in order, so 1 and 2 are written before 99 fails the batch
    let mut transitions = BTreeMap::new();
    transitions.insert(PostId::new(1), PostState::Deleted);
    transitions.insert(PostId::new(2), PostState::Deleted);
    transitions.insert(PostId::new(99), PostState::Deleted);

    let result = store.commit_transitions(&transitions);
    assert!(matches!(result, Err(StoreError::NotFound(id)) if id == PostId::new(99)));

    assert_eq!(store.get(PostId::new(1)).unwrap().unwrap().state, PostState::ToDelete);
    assert_eq!(store.get(PostId::new(2)).unwrap().unwrap().state, PostState::ToDelete);
}

#[test]
fn test_terminal_states_reject_transitions() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.insert(PostId::new(1), 100).unwrap();
    store.insert_with_state(PostId::new(2), 100, PostState::Deleted).unwrap();

    let mut transitions = BTreeMap::new();
    transitions.insert(PostId::new(1), PostState::CannotDelete);
    transitions.insert(PostId::new(2), PostState::ToDelete);

    let result = store.commit_transitions(&transitions);
    assert!(matches!(
        result,
        Err(StoreError::InvalidTransition { from: PostState::Deleted, to: PostState::ToDelete, .. })
    ));

    // Nothing from the rejected batch landed
    assert_eq!(store.get(PostId::new(1)).unwrap().unwrap().state, PostState::ToDelete);
    assert_eq!(store.get(PostId::new(2)).unwrap().unwrap().state, PostState::Deleted);
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.insert(PostId::new(1), NOW - 100 * DAY).unwrap();
        store.insert(PostId::new(2), NOW - 100 * DAY).unwrap();

        let mut transitions = BTreeMap::new();
        transitions.insert(PostId::new(1), PostState::Deleted);
        store.commit_transitions(&transitions).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.get(PostId::new(1)).unwrap().unwrap().state, PostState::Deleted);

    let eligible = store.select_eligible(retention_days(25), NOW).unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, PostId::new(2));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = PostState> {
        prop_oneof![
            Just(PostState::ToDelete),
            Just(PostState::Deleted),
            Just(PostState::ToKeep),
            Just(PostState::CannotDelete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A record is selected iff it is ToDelete and older than the cutoff
        #[test]
        fn test_select_eligible_matches_predicate(
            records in proptest::collection::btree_map(0u64..10_000, (0u64..200, any_state()), 0..40),
            retention in 0u64..100,
        ) {
            let mut store = SqliteStore::in_memory().unwrap();
            for (id, (age_days, state)) in &records {
                store.insert_with_state(PostId::new(*id), NOW - age_days * DAY, *state).unwrap();
            }

            let mut selected: Vec<u64> = store
                .select_eligible(retention_days(retention), NOW)
                .unwrap()
                .into_iter()
                .map(|r| r.id.value())
                .collect();
            selected.sort_unstable();

            let cutoff = NOW - retention * DAY;
            let expected: Vec<u64> = records
                .iter()
                .filter(|(_, (age_days, state))| {
                    *state == PostState::ToDelete && NOW - age_days * DAY < cutoff
                })
                .map(|(id, _)| *id)
                .collect();

            prop_assert_eq!(selected, expected);
        }
    }
}
