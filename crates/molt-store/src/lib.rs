//! Molt Storage Layer
//!
//! Implements the RecordStore trait using SQLite.
//!
//! # Architecture
//!
//! - One `posts` table keyed by the remote post id (see `schema.sql`)
//! - Records are never removed; retired posts stay as an audit trail
//! - Every mutation runs in a transaction with `synchronous = FULL`, so it is
//!   durable once the call returns
//!
//! # Examples
//!
//! ```no_run
//! use molt_domain::PostId;
//! use molt_domain::traits::RecordStore;
//! use molt_store::SqliteStore;
//!
//! let mut store = SqliteStore::new("posts.db").unwrap();
//! store.insert(PostId::new(42), 1_500_000_000).unwrap();
//! ```

#![warn(missing_docs)]

use molt_domain::traits::RecordStore;
use molt_domain::{eligibility_cutoff, PostId, PostRecord, PostState, StateCounts};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Post not found: {0}")]
    NotFound(PostId),

    /// Transition not allowed by the record lifecycle
    #[error("Invalid transition for post {id}: {from} -> {to}")]
    InvalidTransition {
        /// Record the transition targeted
        id: PostId,
        /// State currently stored
        from: PostState,
        /// Requested state
        to: PostState,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of RecordStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. The retirement scheduler keeps the store
/// on its own task and only touches it before and after the worker pool runs.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.pragma_update(None, "synchronous", "FULL")?;
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Convert PostId to its SQLite representation
    fn post_id_to_sql(id: PostId) -> Result<i64, StoreError> {
        i64::try_from(id.value())
            .map_err(|_| StoreError::InvalidData(format!("Post id {} exceeds the storable range", id)))
    }

    /// Convert a timestamp to its SQLite representation
    fn timestamp_to_sql(ts: u64) -> Result<i64, StoreError> {
        i64::try_from(ts)
            .map_err(|_| StoreError::InvalidData(format!("Timestamp {} exceeds the storable range", ts)))
    }

    /// Convert a stored state name to PostState
    fn str_to_state(s: &str) -> Result<PostState, StoreError> {
        PostState::parse(s).ok_or_else(|| StoreError::InvalidData(format!("Unknown post state: {}", s)))
    }

    /// Map a `(id, created_at, state)` row to a PostRecord
    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRecord> {
        let id: i64 = row.get(0)?;
        let created_at: i64 = row.get(1)?;
        let state: String = row.get(2)?;

        let state = Self::str_to_state(&state).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(PostRecord {
            id: PostId::new(id as u64),
            created_at: created_at.max(0) as u64,
            state,
        })
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn insert_with_state(
        &mut self,
        id: PostId,
        created_at: u64,
        state: PostState,
    ) -> Result<bool, Self::Error> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO posts (id, created_at, state) VALUES (?1, ?2, ?3)",
            params![
                Self::post_id_to_sql(id)?,
                Self::timestamp_to_sql(created_at)?,
                state.as_str(),
            ],
        )?;

        Ok(inserted == 1)
    }

    fn insert_batch(&mut self, posts: &[(PostId, u64)]) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO posts (id, created_at, state) VALUES (?1, ?2, 'to_delete')",
            )?;
            for (id, created_at) in posts {
                inserted += stmt.execute(params![
                    Self::post_id_to_sql(*id)?,
                    Self::timestamp_to_sql(*created_at)?,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(offered = posts.len(), inserted, "Inserted post batch");
        Ok(inserted)
    }

    fn get(&self, id: PostId) -> Result<Option<PostRecord>, Self::Error> {
        let record = self
            .conn
            .query_row(
                "SELECT id, created_at, state FROM posts WHERE id = ?1",
                params![Self::post_id_to_sql(id)?],
                Self::row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    fn select_eligible(&self, retention: Duration, now: u64) -> Result<Vec<PostRecord>, Self::Error> {
        let cutoff = Self::timestamp_to_sql(eligibility_cutoff(now, retention))?;

        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, state FROM posts WHERE state = 'to_delete' AND created_at < ?1",
        )?;
        let records = stmt
            .query_map(params![cutoff], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn count_eligible(&self, retention: Duration, now: u64) -> Result<usize, Self::Error> {
        let cutoff = Self::timestamp_to_sql(eligibility_cutoff(now, retention))?;

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE state = 'to_delete' AND created_at < ?1",
            params![cutoff],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn commit_transitions(
        &mut self,
        transitions: &BTreeMap<PostId, PostState>,
    ) -> Result<usize, Self::Error> {
        if transitions.is_empty() {
            return Ok(0);
        }

        // Dropping the transaction on any early return rolls the whole batch back.
        let tx = self.conn.transaction()?;
        let mut committed = 0;
        {
            let mut current_state = tx.prepare("SELECT state FROM posts WHERE id = ?1")?;
            let mut update = tx.prepare("UPDATE posts SET state = ?2 WHERE id = ?1")?;

            for (id, next) in transitions {
                let raw_id = Self::post_id_to_sql(*id)?;
                let stored: Option<String> = current_state
                    .query_row(params![raw_id], |row| row.get(0))
                    .optional()?;
                let from = match stored {
                    Some(state) => Self::str_to_state(&state)?,
                    None => return Err(StoreError::NotFound(*id)),
                };

                if !from.can_transition_to(*next) {
                    return Err(StoreError::InvalidTransition {
                        id: *id,
                        from,
                        to: *next,
                    });
                }

                committed += update.execute(params![raw_id, next.as_str()])?;
            }
        }
        tx.commit()?;

        tracing::debug!(committed, "Committed state transitions");
        Ok(committed)
    }

    fn counts_by_state(&self) -> Result<StateCounts, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM posts GROUP BY state")?;

        let mut counts = StateCounts::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (state, count) = row?;
            counts.set(Self::str_to_state(&state)?, count as usize);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversion_rejects_out_of_range() {
        assert_eq!(SqliteStore::post_id_to_sql(PostId::new(42)).unwrap(), 42);
        assert!(matches!(
            SqliteStore::post_id_to_sql(PostId::new(u64::MAX)),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_unknown_state_is_invalid_data() {
        assert!(matches!(
            SqliteStore::str_to_state("removed"),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_commit_is_a_no_op() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.commit_transitions(&BTreeMap::new()).unwrap(), 0);
    }
}
