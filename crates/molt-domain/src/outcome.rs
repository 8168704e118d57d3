//! Remote outcome vocabulary and the outcome classifier
//!
//! Every delete attempt resolves to exactly one [`RemoteOutcome`]. The classifier
//! maps per-record outcomes to lifecycle transitions:
//!
//! | Outcome | Resulting state |
//! |---------|-----------------|
//! | `Confirmed` | `Deleted` |
//! | `PermanentlyBlocked` | `CannotDelete` |
//! | `TransientFailure` | unchanged |
//!
//! `Unauthenticated` is not a per-record verdict. The scheduler acts on it
//! before classification by halting dispatch for the whole run, and
//! [`classify`] leaves the record unchanged.
//!
//! Attempts skipped because of cancellation never produce an outcome and stay unchanged.

use crate::PostState;
use std::fmt;

/// Result of one remote delete attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The delete succeeded, or the post was already gone
    Confirmed,

    /// The post can never be deleted (e.g. the owning account is suspended)
    PermanentlyBlocked(String),

    /// Rate limiting, network error or unrecognized API error; may succeed later
    TransientFailure(String),

    /// Credentials were rejected; fatal for the run, not for the record
    Unauthenticated(String),
}

impl RemoteOutcome {
    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            RemoteOutcome::Confirmed => "confirmed",
            RemoteOutcome::PermanentlyBlocked(_) => "permanently_blocked",
            RemoteOutcome::TransientFailure(_) => "transient_failure",
            RemoteOutcome::Unauthenticated(_) => "unauthenticated",
        }
    }

    /// Detail message carried by the outcome, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            RemoteOutcome::Confirmed => None,
            RemoteOutcome::PermanentlyBlocked(d)
            | RemoteOutcome::TransientFailure(d)
            | RemoteOutcome::Unauthenticated(d) => Some(d),
        }
    }
}

impl fmt::Display for RemoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.label(), detail),
            None => f.write_str(self.label()),
        }
    }
}

/// Map a remote outcome to the state the record should move to
///
/// Returns `None` when the record must stay as it is. Only outcomes that are
/// certain and remote-authoritative advance state.
///
/// # Examples
///
/// ```
/// use molt_domain::{classify, PostState, RemoteOutcome};
///
/// assert_eq!(classify(&RemoteOutcome::Confirmed), Some(PostState::Deleted));
/// assert_eq!(classify(&RemoteOutcome::TransientFailure("HTTP 429".into())), None);
/// ```
pub fn classify(outcome: &RemoteOutcome) -> Option<PostState> {
    match outcome {
        RemoteOutcome::Confirmed => Some(PostState::Deleted),
        RemoteOutcome::PermanentlyBlocked(_) => Some(PostState::CannotDelete),
        RemoteOutcome::TransientFailure(_) | RemoteOutcome::Unauthenticated(_) => None,
    }
}
