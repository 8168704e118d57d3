//! Core Retirer implementation: one retirement run as a state machine

use crate::worker::{self, Attempt, RunContext};
use crate::{RetireError, RetirerConfig, RunReport};
use molt_domain::traits::{ClientFactory, RecordStore};
use molt_domain::{PostState, RemoteOutcome};
use std::collections::BTreeMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Phase of the most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run started yet
    Idle,

    /// Querying the store for eligible records and connecting
    Selecting,

    /// Workers are issuing remote deletes
    Running,

    /// Collecting results and committing transitions; cancellation is not observed
    Finalizing,

    /// The run completed and its transitions are committed
    Done,

    /// The run stopped without committing (connection or storage failure)
    Aborted,
}

/// Retirement engine
///
/// Responsible for:
/// - Selecting `ToDelete` records older than the retention window
/// - Driving a bounded pool of concurrent remote deletes
/// - Classifying outcomes and committing them as one atomic batch
/// - Producing a [`RunReport`]
///
/// # Examples
///
/// ```no_run
/// use molt_remote::{HttpClientFactory, RemoteConfig};
/// use molt_retirer::{Retirer, RetirerConfig};
/// use molt_store::SqliteStore;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("posts.db")?;
/// let factory = HttpClientFactory::new(RemoteConfig::default());
/// let mut retirer = Retirer::new(RetirerConfig::default());
///
/// let report = retirer.run(&mut store, &factory, &CancellationToken::new()).await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Retirer {
    config: RetirerConfig,
    phase: RunPhase,
}

impl Retirer {
    /// Create a new Retirer with the given configuration
    pub fn new(config: RetirerConfig) -> Self {
        Self {
            config,
            phase: RunPhase::Idle,
        }
    }

    /// Create a Retirer with default configuration
    pub fn default_config() -> Self {
        Self::new(RetirerConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &RetirerConfig {
        &self.config
    }

    /// Phase reached by the most recent run
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Perform a retirement run now
    ///
    /// `cancel` is polled by workers before each remote call. Cancelling it lets
    /// in-flight calls finish, skips the rest, and still commits every
    /// classified result before returning.
    ///
    /// # Errors
    ///
    /// - `ConnectionFailed` when the session cannot be established; no record is touched
    /// - `Store` when selection or the commit fails; a failed commit lands nothing
    /// - `Config` when the configuration is invalid
    pub async fn run<S, F>(
        &mut self,
        store: &mut S,
        factory: &F,
        cancel: &CancellationToken,
    ) -> Result<RunReport, RetireError>
    where
        S: RecordStore,
        S::Error: std::fmt::Display,
        F: ClientFactory,
    {
        self.run_at(store, factory, cancel, current_timestamp()).await
    }

    /// Perform a retirement run as if it started at `now` (seconds since Unix epoch)
    pub async fn run_at<S, F>(
        &mut self,
        store: &mut S,
        factory: &F,
        cancel: &CancellationToken,
        now: u64,
    ) -> Result<RunReport, RetireError>
    where
        S: RecordStore,
        S::Error: std::fmt::Display,
        F: ClientFactory,
    {
        self.config.validate()?;

        let run_id = Uuid::now_v7();
        let span = tracing::info_span!("retirement_run", %run_id);
        self.execute(store, factory, cancel, now, run_id)
            .instrument(span)
            .await
    }

    async fn execute<S, F>(
        &mut self,
        store: &mut S,
        factory: &F,
        cancel: &CancellationToken,
        now: u64,
        run_id: Uuid,
    ) -> Result<RunReport, RetireError>
    where
        S: RecordStore,
        S::Error: std::fmt::Display,
        F: ClientFactory,
    {
        let started = Instant::now();
        self.enter(RunPhase::Selecting);

        let eligible = match store.select_eligible(self.config.retention(), now) {
            Ok(eligible) => eligible,
            Err(e) => {
                self.enter(RunPhase::Aborted);
                return Err(RetireError::Store(e.to_string()));
            }
        };
        tracing::info!(
            eligible = eligible.len(),
            retention_days = self.config.retention_days,
            "Posts to delete: {}",
            eligible.len()
        );

        let mut report = RunReport::new(run_id, eligible.len());

        if self.config.dry_run {
            for record in &eligible {
                tracing::info!(id = %record.id, created_at = record.created_at, "DRY RUN: would delete");
            }
            report.dry_run = true;
            report.elapsed = started.elapsed();
            self.enter(RunPhase::Done);
            return Ok(report);
        }

        let client = match factory.connect().await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Could not establish remote session: {}", e);
                self.enter(RunPhase::Aborted);
                return Err(RetireError::ConnectionFailed(e.to_string()));
            }
        };

        self.enter(RunPhase::Running);
        let halt = cancel.child_token();
        let attempts = worker::run_pool(
            RunContext::new(client, halt),
            eligible,
            self.config.workers,
        )
        .await;

        // From here on the cancel token is not consulted: the commit always runs.
        self.enter(RunPhase::Finalizing);
        report.cancelled = cancel.is_cancelled();

        let mut transitions = BTreeMap::new();
        for result in &attempts {
            let next = result.new_state();
            if let Some(state) = next {
                transitions.insert(result.id, state);
            }

            match (&result.attempt, next) {
                (Attempt::Skipped, _) => report.record_skipped(),
                (_, Some(PostState::CannotDelete)) => report.record_blocked(),
                (_, Some(_)) => report.record_deleted(),
                (Attempt::Completed(outcome), None) => {
                    if let RemoteOutcome::Unauthenticated(_) = outcome {
                        report.credentials_rejected = true;
                    }
                    report.record_failure(result.id, outcome.detail().unwrap_or(outcome.label()));
                }
            }
        }

        if report.cancelled {
            tracing::warn!(skipped = report.skipped, "Run cancelled, committing completed deletions");
        }
        tracing::info!(transitions = transitions.len(), "Updating database");

        report.committed = match store.commit_transitions(&transitions) {
            Ok(committed) => committed,
            Err(e) => {
                tracing::error!("Commit failed, no transition was applied: {}", e);
                self.enter(RunPhase::Aborted);
                return Err(RetireError::Store(e.to_string()));
            }
        };

        report.elapsed = started.elapsed();
        self.enter(RunPhase::Done);

        tracing::info!(
            examined = report.examined,
            deleted = report.deleted,
            blocked = report.blocked,
            still_pending = report.still_pending(),
            "Retirement run finished"
        );

        Ok(report)
    }

    fn enter(&mut self, phase: RunPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "Run phase transition");
        self.phase = phase;
    }
}
