//! Molt Retirer
//!
//! Retirement runs: select posts older than the retention window, delete them
//! remotely through a bounded pool of workers, and record the outcome of every
//! attempt.
//!
//! # Overview
//!
//! A run moves through these phases:
//!
//! | Phase | What happens | Cancellation |
//! |-------|--------------|--------------|
//! | **Selecting** | Eligible `ToDelete` records are read; the remote session is established | Not observed |
//! | **Running** | Up to `workers` deletes are in flight at once | Checked before every remote call |
//! | **Finalizing** | Outcomes are classified and committed as one atomic batch | Not observed |
//! | **Done** | The [`RunReport`] is returned | |
//!
//! A failed connection or a failed selection aborts the run before any record
//! changes. Per-record failures never end a run: transient failures leave the
//! record pending for the next one. A credentials rejection in the middle of a
//! run stops further dispatch, and what was already confirmed is still committed.
//!
//! # Usage
//!
//! ```no_run
//! use molt_remote::{HttpClientFactory, RemoteConfig};
//! use molt_retirer::{Retirer, RetirerConfig};
//! use molt_store::SqliteStore;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = SqliteStore::new("posts.db")?;
//!     let factory = HttpClientFactory::new(RemoteConfig::default());
//!     let mut retirer = Retirer::new(RetirerConfig {
//!         retention_days: 25,
//!         workers: 5,
//!         dry_run: false,
//!     });
//!
//!     let cancel = CancellationToken::new();
//!     let report = retirer.run(&mut store, &factory, &cancel).await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod report;
mod retirer;
mod worker;

pub use config::RetirerConfig;
pub use error::RetireError;
pub use report::{RecordFailure, RunReport};
pub use retirer::{RunPhase, Retirer};
