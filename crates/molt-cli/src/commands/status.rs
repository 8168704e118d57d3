//! Status command implementation.

use crate::commands::{open_store, unix_now};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use molt_domain::traits::RecordStore;
use molt_domain::StateCounts;
use molt_retirer::RetirerConfig;
use molt_store::SqliteStore;

/// Execute the status command.
pub fn execute_status(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let (counts, eligible) = status(&store, &config.retirement, unix_now())?;

    println!("{}", formatter.format_status(&counts, eligible)?);
    Ok(())
}

/// Counts by state and the number of posts a run started at `now` would examine.
pub fn status(store: &SqliteStore, retirement: &RetirerConfig, now: u64) -> Result<(StateCounts, usize)> {
    let counts = store.counts_by_state()?;
    let eligible = store.count_eligible(retirement.retention(), now)?;
    Ok((counts, eligible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use molt_domain::{PostId, PostState};

    const DAY: u64 = 86_400;
    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_status_counts() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.insert(PostId::new(1), NOW - 30 * DAY).unwrap();
        store.insert(PostId::new(2), NOW - DAY).unwrap();
        store.insert_with_state(PostId::new(3), NOW - 300 * DAY, PostState::Deleted).unwrap();

        let (counts, eligible) = status(&store, &RetirerConfig::default(), NOW).unwrap();
        assert_eq!(counts.get(PostState::ToDelete), 2);
        assert_eq!(counts.get(PostState::Deleted), 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(eligible, 1);
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        let (counts, eligible) = status(&store, &RetirerConfig::default(), NOW).unwrap();
        assert_eq!(counts.total(), 0);
        assert_eq!(eligible, 0);
    }
}
