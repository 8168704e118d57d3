//! Bounded pool of deletion workers
//!
//! A fixed number of tasks drain a shared queue of eligible records. Each
//! worker checks the run's halt token before issuing a remote call; a call that
//! already started always runs to completion. Results are sent to a single
//! collection point as soon as they exist and are read only after every worker
//! has been joined.

use molt_domain::traits::DeletionClient;
use molt_domain::{classify, PostId, PostRecord, PostState, RemoteOutcome};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Per-run context handed to every worker
///
/// Holds the authenticated client and the halt token. Nothing here outlives the run.
pub(crate) struct RunContext<C> {
    client: Arc<C>,
    halt: CancellationToken,
}

impl<C> RunContext<C> {
    pub(crate) fn new(client: C, halt: CancellationToken) -> Self {
        Self {
            client: Arc::new(client),
            halt,
        }
    }
}

impl<C> Clone for RunContext<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            halt: self.halt.clone(),
        }
    }
}

/// What happened to one record during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// The remote call was made and resolved to an outcome
    Completed(RemoteOutcome),

    /// The run was halting; the remote was never contacted
    Skipped,
}

/// One record's attempt, as reported by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttemptResult {
    pub(crate) id: PostId,
    pub(crate) attempt: Attempt,
}

impl AttemptResult {
    /// State the record moves to, or `None` to leave it `ToDelete`
    pub(crate) fn new_state(&self) -> Option<PostState> {
        match &self.attempt {
            Attempt::Completed(outcome) => classify(outcome),
            Attempt::Skipped => None,
        }
    }
}

/// Offer every record to the pool and collect one result per record
///
/// Records held by a worker that panicked produce no result; the caller
/// treats them as still pending.
pub(crate) async fn run_pool<C>(
    ctx: RunContext<C>,
    records: Vec<PostRecord>,
    workers: usize,
) -> Vec<AttemptResult>
where
    C: DeletionClient + 'static,
{
    let total = records.len();
    let worker_count = workers.max(1).min(total);
    let queue = Arc::new(Mutex::new(VecDeque::from(records)));
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();

    let mut pool = JoinSet::new();
    for worker in 0..worker_count {
        pool.spawn(worker_loop(
            worker,
            ctx.clone(),
            Arc::clone(&queue),
            results_tx.clone(),
        ));
    }
    drop(results_tx);

    tracing::debug!(workers = worker_count, records = total, "Deletion workers started");

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Deletion worker failed: {}", e);
        }
    }

    let mut results = Vec::with_capacity(total);
    while let Some(result) = results_rx.recv().await {
        results.push(result);
    }
    results
}

async fn worker_loop<C>(
    worker: usize,
    ctx: RunContext<C>,
    queue: Arc<Mutex<VecDeque<PostRecord>>>,
    results: mpsc::UnboundedSender<AttemptResult>,
) where
    C: DeletionClient,
{
    loop {
        let next = queue.lock().await.pop_front();
        let Some(record) = next else { break };

        let attempt = if ctx.halt.is_cancelled() {
            Attempt::Skipped
        } else {
            let outcome = ctx.client.delete(record.id).await;
            log_outcome(worker, &record, &outcome);

            if let RemoteOutcome::Unauthenticated(_) = outcome {
                ctx.halt.cancel();
            }
            Attempt::Completed(outcome)
        };

        // The receiver lives until every worker is joined
        let _ = results.send(AttemptResult {
            id: record.id,
            attempt,
        });
    }
}

fn log_outcome(worker: usize, record: &PostRecord, outcome: &RemoteOutcome) {
    match outcome {
        RemoteOutcome::Confirmed => {
            tracing::info!(worker, id = %record.id, created_at = record.created_at, "delete: ok");
        }
        RemoteOutcome::PermanentlyBlocked(detail) => {
            tracing::warn!(worker, id = %record.id, "delete: permanently blocked: {}", detail);
        }
        RemoteOutcome::TransientFailure(detail) => {
            tracing::warn!(worker, id = %record.id, "delete: will retry next run: {}", detail);
        }
        RemoteOutcome::Unauthenticated(detail) => {
            tracing::error!(worker, id = %record.id, "delete: credentials rejected, halting run: {}", detail);
        }
    }
}
