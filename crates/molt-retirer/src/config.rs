//! Configuration for retirement runs
//!
//! Defines the retention window and the size of the deletion worker pool.

use crate::RetireError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Retirer
///
/// # Examples
///
/// ```
/// use molt_retirer::RetirerConfig;
///
/// let config = RetirerConfig::default();
/// assert_eq!(config.retention_days, 25);
/// assert_eq!(config.workers, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirerConfig {
    /// Minimum age of a post before it is retired (in days)
    /// Default: 25 days
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Number of concurrent delete workers
    /// Default: 5
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Dry-run mode: select and report eligible posts without contacting the remote
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_retention_days() -> u64 {
    25
}

fn default_workers() -> usize {
    5
}

impl Default for RetirerConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            workers: default_workers(),
            dry_run: false,
        }
    }
}

impl RetirerConfig {
    /// Get the retention window as Duration
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(86_400))
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<(), RetireError> {
        if self.workers == 0 {
            return Err(RetireError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
