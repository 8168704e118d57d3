//! Ctrl-C handling for retirement runs.
//!
//! The first interrupt cancels the run; the run then stops dispatching and
//! commits what it already has. Further interrupts are logged and ignored
//! until the guard is dropped.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Keeps an interrupt listener alive for the duration of a run
///
/// Dropping the guard stops the listener but does not restore the default
/// Ctrl-C behaviour: tokio keeps its SIGINT handler registered for the rest
/// of the process. Anything that runs after the guard is gone cannot be
/// interrupted, so callers should finish promptly once a run was cancelled.
pub struct InterruptGuard {
    listener: JoinHandle<()>,
    received: Arc<AtomicUsize>,
}

impl InterruptGuard {
    /// Cancel `cancel` on the first Ctrl-C.
    pub fn install(cancel: CancellationToken) -> Self {
        Self::listen(cancel, tokio::signal::ctrl_c)
    }

    /// Cancel `cancel` the first time `next_interrupt` resolves successfully.
    ///
    /// The listener stops when `next_interrupt` fails or the guard is dropped.
    pub fn listen<F, Fut>(cancel: CancellationToken, mut next_interrupt: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = io::Result<()>> + Send + 'static,
    {
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);

        let listener = tokio::spawn(async move {
            while next_interrupt().await.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
                if cancel.is_cancelled() {
                    tracing::warn!("Interrupt ignored, finishing the database update");
                } else {
                    tracing::warn!("Interrupt received, aborting");
                    cancel.cancel();
                }
            }
        });

        Self { listener, received }
    }

    /// Number of interrupts seen so far
    pub fn interrupts(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
