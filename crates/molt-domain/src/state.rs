//! State module - lifecycle stages for post records

use std::collections::HashMap;

/// State in the post record lifecycle
///
/// Records progress through states as retirement runs classify remote outcomes:
/// - ToDelete: Tracked and waiting for retirement (initial state)
/// - Deleted: Confirmed absent remotely (terminal)
/// - ToKeep: Excluded from retirement by curation (never reached automatically)
/// - CannotDelete: The remote will never accept the delete (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PostState {
    /// Eligible for retirement once old enough
    ToDelete,

    /// Confirmed deleted (or already gone) remotely
    Deleted,

    /// Kept on purpose; reserved for manual curation
    ToKeep,

    /// Deletion can never succeed (e.g. the owning account is suspended)
    CannotDelete,
}

impl PostState {
    /// All states, in display order
    pub const ALL: [PostState; 4] = [
        PostState::ToDelete,
        PostState::Deleted,
        PostState::ToKeep,
        PostState::CannotDelete,
    ];

    /// Get the persisted name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            PostState::ToDelete => "to_delete",
            PostState::Deleted => "deleted",
            PostState::ToKeep => "to_keep",
            PostState::CannotDelete => "cannot_delete",
        }
    }

    /// Parse a state from its persisted name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "to_delete" => Some(PostState::ToDelete),
            "deleted" => Some(PostState::Deleted),
            "to_keep" => Some(PostState::ToKeep),
            "cannot_delete" => Some(PostState::CannotDelete),
            _ => None,
        }
    }

    /// Whether no transition can ever leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostState::Deleted | PostState::CannotDelete)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle transition
    ///
    /// Same-state moves are not transitions and are rejected.
    pub fn can_transition_to(&self, next: PostState) -> bool {
        match self {
            PostState::ToDelete => matches!(
                next,
                PostState::Deleted | PostState::CannotDelete | PostState::ToKeep
            ),
            PostState::ToKeep => next == PostState::ToDelete,
            PostState::Deleted | PostState::CannotDelete => false,
        }
    }
}

impl std::str::FromStr for PostState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid post state: {}", s))
    }
}

impl std::fmt::Display for PostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time number of records per state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateCounts {
    counts: HashMap<PostState, usize>,
}

impl StateCounts {
    /// Create empty counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the count for a state
    pub fn set(&mut self, state: PostState, count: usize) {
        self.counts.insert(state, count);
    }

    /// Count for a state (zero when absent)
    pub fn get(&self, state: PostState) -> usize {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    /// Total number of known records
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate over every state with its count, in display order
    pub fn iter(&self) -> impl Iterator<Item = (PostState, usize)> + '_ {
        PostState::ALL.iter().map(move |state| (*state, self.get(*state)))
    }
}
