//! Run report produced at the end of every retirement run

use molt_domain::PostId;
use std::time::Duration;
use uuid::Uuid;

/// A per-record failure that left the record pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Record the attempt targeted
    pub id: PostId,

    /// What the remote reported
    pub detail: String,
}

/// Aggregate counts for one retirement run
///
/// `examined` is the size of the eligible set; every examined record ends up
/// exactly once in `deleted`, `blocked` or [`still_pending`](Self::still_pending).
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Identifier of the run (UUIDv7), also attached to the run's log span
    pub run_id: Uuid,

    /// Eligible records selected at run start
    pub examined: usize,

    /// Records newly confirmed deleted
    pub deleted: usize,

    /// Records newly moved to `CannotDelete`
    pub blocked: usize,

    /// Records never offered to the remote because the run was stopping
    pub skipped: usize,

    /// Records whose attempt failed transiently or was rejected for credentials
    pub failures: Vec<RecordFailure>,

    /// Transitions written to the store
    pub committed: usize,

    /// The run was cancelled from outside
    pub cancelled: bool,

    /// The remote rejected the credentials mid-run; dispatch stopped early
    pub credentials_rejected: bool,

    /// No remote call was made (dry-run mode)
    pub dry_run: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunReport {
    /// Create an empty report for a run over `examined` records
    pub fn new(run_id: Uuid, examined: usize) -> Self {
        Self {
            run_id,
            examined,
            deleted: 0,
            blocked: 0,
            skipped: 0,
            failures: Vec::new(),
            committed: 0,
            cancelled: false,
            credentials_rejected: false,
            dry_run: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Record a confirmed deletion
    pub fn record_deleted(&mut self) {
        self.deleted += 1;
    }

    /// Record a permanently blocked record
    pub fn record_blocked(&mut self) {
        self.blocked += 1;
    }

    /// Record an attempt skipped because the run was stopping
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record a failed attempt that leaves the record pending
    pub fn record_failure(&mut self, id: PostId, detail: impl Into<String>) {
        self.failures.push(RecordFailure {
            id,
            detail: detail.into(),
        });
    }

    /// Records still `ToDelete` after this run
    pub fn still_pending(&self) -> usize {
        self.examined.saturating_sub(self.deleted + self.blocked)
    }

    /// Whether every examined record reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.still_pending() == 0
    }

    /// Generate a human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Retirement Run {}", self.run_id),
            "==============================================".to_string(),
            format!("Examined:      {}", self.examined),
            format!("Deleted:       {}", self.deleted),
            format!("Blocked:       {}", self.blocked),
            format!("Still pending: {}", self.still_pending()),
            format!("Elapsed:       {:.1}s", self.elapsed.as_secs_f64()),
        ];

        if self.dry_run {
            lines.push("Dry run: no remote calls were made".to_string());
        }
        if self.cancelled {
            lines.push(format!("Cancelled: {} record(s) skipped", self.skipped));
        }
        if self.credentials_rejected {
            lines.push("Credentials were rejected during the run".to_string());
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push(format!("Failures ({}):", self.failures.len()));
            for failure in &self.failures {
                lines.push(format!("  {}: {}", failure.id, failure.detail));
            }
        }

        lines.join("\n")
    }
}
