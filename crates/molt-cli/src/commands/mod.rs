//! Command implementations.

pub mod ingest;
pub mod run;
pub mod status;

pub use self::ingest::execute_ingest;
pub use self::run::execute_run;
pub use self::status::execute_status;

use crate::config::Config;
use crate::error::Result;
use molt_store::SqliteStore;
use std::fs;

/// Open the configured post database, creating its directory when needed.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    tracing::debug!(database = %path.display(), "Opening post database");
    Ok(SqliteStore::new(&path)?)
}

/// Current time in seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
