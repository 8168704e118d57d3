//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::interrupt::InterruptGuard;
use crate::output::Formatter;
use molt_domain::traits::{ClientFactory, RecordStore};
use molt_remote::HttpClientFactory;
use molt_retirer::{Retirer, RetirerConfig, RunReport};
use tokio_util::sync::CancellationToken;

/// Process exit code for a run whose credentials were rejected.
pub const EXIT_CREDENTIALS_REJECTED: i32 = 2;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<RunReport> {
    let retirement = apply_overrides(&config.retirement, &args);
    let mut store = open_store(config)?;
    let factory = HttpClientFactory::new(config.remote.clone());

    let report = retire(&mut store, &factory, retirement).await?;
    println!("{}", formatter.format_report(&report)?);

    Ok(report)
}

/// Command-line flags take precedence over the config file.
pub fn apply_overrides(base: &RetirerConfig, args: &RunArgs) -> RetirerConfig {
    let mut config = base.clone();
    if let Some(days) = args.retention_days {
        config.retention_days = days;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.dry_run {
        config.dry_run = true;
    }
    config
}

/// Perform one retirement run with Ctrl-C wired to cancellation.
pub async fn retire<S, F>(store: &mut S, factory: &F, config: RetirerConfig) -> Result<RunReport>
where
    S: RecordStore,
    S::Error: std::fmt::Display,
    F: ClientFactory,
{
    let cancel = CancellationToken::new();
    let _interrupts = InterruptGuard::install(cancel.clone());

    let mut retirer = Retirer::new(config);
    let report = retirer.run(store, factory, &cancel).await?;
    Ok(report)
}

/// Whether the default flow should print status after the run.
///
/// An interrupted run exits straight after its report, because Ctrl-C stays
/// captured by the process once a run has listened for it.
pub fn shows_final_status(report: &RunReport) -> bool {
    !report.cancelled
}

/// Exit code that reflects how the run ended.
pub fn exit_code(report: &RunReport) -> i32 {
    if report.credentials_rejected {
        EXIT_CREDENTIALS_REJECTED
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use molt_domain::{PostId, PostState, RemoteOutcome};
    use molt_remote::{MockClientFactory, MockDeletionClient};
    use molt_retirer::RetireError;
    use molt_store::SqliteStore;

    const DAY: u64 = 86_400;

    fn store_with_old_post() -> SqliteStore {
        let mut store = SqliteStore::in_memory().unwrap();
        store.insert(PostId::new(1), crate::commands::unix_now() - 90 * DAY).unwrap();
        store
    }

    #[test]
    fn test_flags_override_config() {
        let base = RetirerConfig::default();
        let args = RunArgs {
            retention_days: Some(3),
            workers: None,
            dry_run: true,
        };

        let config = apply_overrides(&base, &args);
        assert_eq!(config.retention_days, 3);
        assert_eq!(config.workers, base.workers);
        assert!(config.dry_run);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let base = RetirerConfig {
            retention_days: 40,
            workers: 2,
            dry_run: false,
        };
        let config = apply_overrides(&base, &RunArgs::default());
        assert_eq!(config.retention_days, 40);
        assert_eq!(config.workers, 2);
        assert!(!config.dry_run);
    }

    #[tokio::test]
    async fn test_retire_deletes_old_posts() {
        let mut store = store_with_old_post();
        let factory = MockClientFactory::new(MockDeletionClient::default());

        let report = retire(&mut store, &factory, RetirerConfig::default()).await.unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(exit_code(&report), 0);
        assert_eq!(store.get(PostId::new(1)).unwrap().unwrap().state, PostState::Deleted);
    }

    #[tokio::test]
    async fn test_rejected_credentials_exit_code() {
        let mut store = store_with_old_post();
        let client = MockDeletionClient::new(RemoteOutcome::Unauthenticated("API error 89".into()));
        let factory = MockClientFactory::new(client);

        let report = retire(&mut store, &factory, RetirerConfig::default()).await.unwrap();

        assert!(report.credentials_rejected);
        assert_eq!(exit_code(&report), EXIT_CREDENTIALS_REJECTED);
    }

    #[tokio::test]
    async fn test_interrupted_run_skips_final_status() {
        let mut store = store_with_old_post();
        let factory = MockClientFactory::new(MockDeletionClient::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = Retirer::new(RetirerConfig::default())
            .run(&mut store, &factory, &cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(!shows_final_status(&report));
        assert_eq!(exit_code(&report), 0);
    }

    #[tokio::test]
    async fn test_completed_run_shows_final_status() {
        let mut store = store_with_old_post();
        let factory = MockClientFactory::new(MockDeletionClient::default());

        let report = retire(&mut store, &factory, RetirerConfig::default()).await.unwrap();
        assert!(shows_final_status(&report));
    }

    #[tokio::test]
    async fn test_connection_failure_is_an_error() {
        let mut store = store_with_old_post();
        let factory = MockClientFactory::failing("no token");

        let result = retire(&mut store, &factory, RetirerConfig::default()).await;
        assert!(matches!(
            result,
            Err(CliError::Retire(RetireError::ConnectionFailed(_)))
        ));
    }
}
