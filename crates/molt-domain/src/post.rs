//! Post module - the tracked unit of the retirement engine

use crate::PostState;
use std::fmt;
use std::time::Duration;

/// Identifier of a remote post
///
/// Remote post ids are opaque 64-bit integers assigned by the remote service.
/// Identity of a [`PostRecord`] is its `PostId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(u64);

impl PostId {
    /// Wrap a raw remote id
    ///
    /// # Examples
    ///
    /// ```
    /// use molt_domain::PostId;
    ///
    /// let id = PostId::new(1050118621198921728);
    /// assert_eq!(id.value(), 1050118621198921728);
    /// ```
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw id value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parse an id from its decimal representation (`id_str` in remote payloads)
    pub fn parse(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid post id '{}': {}", s, e))
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked remote post
///
/// `created_at` is immutable once the record exists. `state` changes only through
/// committed transitions (see [`PostState::can_transition_to`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Remote post identifier
    pub id: PostId,

    /// When the post was created (seconds since Unix epoch, UTC)
    pub created_at: u64,

    /// Current lifecycle state
    pub state: PostState,
}

impl PostRecord {
    /// Create a record in the initial `ToDelete` state
    pub fn new(id: PostId, created_at: u64) -> Self {
        Self::with_state(id, created_at, PostState::ToDelete)
    }

    /// Create a record in an explicit state
    pub fn with_state(id: PostId, created_at: u64, state: PostState) -> Self {
        Self {
            id,
            created_at,
            state,
        }
    }

    /// Whether this record is eligible for retirement given a cutoff
    ///
    /// A record is eligible iff it is still `ToDelete` and strictly older than the cutoff.
    pub fn is_eligible(&self, cutoff: u64) -> bool {
        self.state == PostState::ToDelete && self.created_at < cutoff
    }
}

/// Compute the eligibility cutoff for a run started at `now`
///
/// Posts created strictly before the returned timestamp are old enough to retire.
///
/// # Examples
///
/// ```
/// use molt_domain::eligibility_cutoff;
/// use std::time::Duration;
///
/// let day = 86_400;
/// assert_eq!(eligibility_cutoff(100 * day, Duration::from_secs(25 * day)), 75 * day);
/// assert_eq!(eligibility_cutoff(10, Duration::from_secs(3600)), 0);
/// ```
pub fn eligibility_cutoff(now: u64, retention: Duration) -> u64 {
    now.saturating_sub(retention.as_secs())
}


#[cfg(test)]
mod proptests {
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
        /// Property: eligibility is exactly `ToDelete && created_at < now - retention`
        #[test]
        fn test_eligibility_predicate(
            created_at in 0u64..10_000_000,
            now in 0u64..10_000_000,
            retention in 0u64..5_000_000,
            state in any_state(),
        ) {
            let record = PostRecord::with_state(PostId::new(7), created_at, state);
            let cutoff = eligibility_cutoff(now, Duration::from_secs(retention));
            let expected = state == PostState::ToDelete
                && (created_at as i128) < (now as i128 - retention as i128);
            prop_assert_eq!(record.is_eligible(cutoff), expected);
        }

        /// Property: PostId ordering matches u64 ordering
        #[test]
        fn test_post_id_ordering(a: u64, b: u64) {
            prop_assert_eq!(PostId::new(a) < PostId::new(b), a < b);
            prop_assert_eq!(PostId::parse(&PostId::new(a).to_string()).unwrap(), PostId::new(a));
        }
    }
}
