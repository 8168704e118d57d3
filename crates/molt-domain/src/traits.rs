//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{PostId, PostRecord, PostState, RemoteOutcome, StateCounts};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Trait for durable storage of post records
///
/// Implemented by the infrastructure layer (molt-store). Every method is durable
/// before it returns success.
pub trait RecordStore {
    /// Error type for store operations
    type Error;

    /// Insert a new `ToDelete` record
    ///
    /// Returns `false` (not an error) when the id is already known; the existing
    /// record is left untouched.
    fn insert(&mut self, id: PostId, created_at: u64) -> Result<bool, Self::Error> {
        self.insert_with_state(id, created_at, PostState::ToDelete)
    }

    /// Insert a new record in an explicit state, with the same duplicate semantics as `insert`
    fn insert_with_state(
        &mut self,
        id: PostId,
        created_at: u64,
        state: PostState,
    ) -> Result<bool, Self::Error>;

    /// Insert many `ToDelete` records as one unit of work
    ///
    /// Returns how many were new.
    fn insert_batch(&mut self, posts: &[(PostId, u64)]) -> Result<usize, Self::Error>;

    /// Get a record by id
    fn get(&self, id: PostId) -> Result<Option<PostRecord>, Self::Error>;

    /// All `ToDelete` records created strictly before `now - retention`
    ///
    /// Ordering is unspecified.
    fn select_eligible(&self, retention: Duration, now: u64) -> Result<Vec<PostRecord>, Self::Error>;

    /// Number of records `select_eligible` would return
    fn count_eligible(&self, retention: Duration, now: u64) -> Result<usize, Self::Error>;

    /// Apply every transition as a single atomic unit of work
    ///
    /// Either all transitions land and the count is returned, or none do and
    /// the error says why.
    fn commit_transitions(
        &mut self,
        transitions: &BTreeMap<PostId, PostState>,
    ) -> Result<usize, Self::Error>;

    /// Number of records in each state
    fn counts_by_state(&self) -> Result<StateCounts, Self::Error>;
}

/// Trait for the remote delete-by-id capability
///
/// Implemented by the infrastructure layer (molt-remote). Ordinary API-level
/// errors never surface as errors: they are folded into a [`RemoteOutcome`].
/// Deleting an id that is already gone must resolve to `Confirmed`.
pub trait DeletionClient: Send + Sync {
    /// Attempt to delete a post
    fn delete(&self, id: PostId) -> impl Future<Output = RemoteOutcome> + Send;
}

/// Trait for producing an authenticated [`DeletionClient`]
///
/// Failing to establish the session is the only run-fatal remote error.
pub trait ClientFactory {
    /// Client produced by a successful connection
    type Client: DeletionClient + 'static;

    /// Error returned when the session cannot be established
    type Error: std::fmt::Display;

    /// Establish an authenticated session
    fn connect(&self) -> impl Future<Output = Result<Self::Client, Self::Error>> + Send;
}
