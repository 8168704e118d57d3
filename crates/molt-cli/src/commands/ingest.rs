//! Ingest command implementation.

use crate::archive::{collect_archive_files, is_zip, read_archive, ArchiveBatch, ZipExport};
use crate::cli::IngestArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use molt_domain::traits::RecordStore;
use molt_store::SqliteStore;
use std::path::PathBuf;

/// What ingesting one archive file did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Archive file
    pub path: PathBuf,

    /// Posts read from the file
    pub read: usize,

    /// Posts that were not in the database yet
    pub inserted: usize,

    /// Entries skipped because they could not be read
    pub malformed: usize,
}

impl IngestSummary {
    /// Posts that were already known
    pub fn duplicates(&self) -> usize {
        self.read.saturating_sub(self.inserted)
    }
}

/// Execute the ingest command.
pub fn execute_ingest(args: IngestArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let summaries = ingest_paths(&mut store, &args.paths)?;

    println!("{}", formatter.format_ingest(&summaries)?);
    Ok(())
}

/// Load every archive file under `paths`, one transaction per file.
///
/// Each post file inside a zipped export counts as its own file.
pub fn ingest_paths(store: &mut SqliteStore, paths: &[PathBuf]) -> Result<Vec<IngestSummary>> {
    let files = collect_archive_files(paths)?;
    let mut summaries = Vec::with_capacity(files.len());

    for path in files {
        if is_zip(&path) {
            let mut export = ZipExport::open(&path)?;
            for entry in export.post_files()? {
                let batch = export.read_entry(&entry)?;
                summaries.push(load_batch(store, export.entry_path(&entry), batch)?);
            }
        } else {
            let batch = read_archive(&path)?;
            summaries.push(load_batch(store, path, batch)?);
        }
    }

    Ok(summaries)
}

fn load_batch(store: &mut SqliteStore, path: PathBuf, batch: ArchiveBatch) -> Result<IngestSummary> {
    let inserted = store.insert_batch(&batch.posts)?;
    tracing::info!(
        file = %path.display(),
        read = batch.posts.len(),
        inserted,
        "Loaded archive file"
    );

    Ok(IngestSummary {
        path,
        read: batch.posts.len(),
        inserted,
        malformed: batch.malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use molt_domain::{PostId, PostState};
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const MONTH: &str = r#"Grailbird.data.tweets_2014_01 = [
      { "id_str" : "100", "created_at" : "2014-01-02 10:00:00 +0000" },
      { "id_str" : "101", "created_at" : "2014-01-03 10:00:00 +0000" }
    ]"#;

    #[test]
    fn test_ingest_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("2014_01.js");
        fs::write(&file, MONTH).unwrap();
        let mut store = SqliteStore::in_memory().unwrap();

        let first = ingest_paths(&mut store, &[file.clone()]).unwrap();
        assert_eq!(first[0].inserted, 2);
        assert_eq!(first[0].duplicates(), 0);

        let second = ingest_paths(&mut store, &[file]).unwrap();
        assert_eq!(second[0].inserted, 0);
        assert_eq!(second[0].duplicates(), 2);

        let record = store.get(PostId::new(100)).unwrap().unwrap();
        assert_eq!(record.state, PostState::ToDelete);
        assert_eq!(record.created_at, 1388656800);
        assert_eq!(store.counts_by_state().unwrap().total(), 2);
    }

    #[test]
    fn test_ingest_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2014_01.js"), MONTH).unwrap();
        fs::write(
            dir.path().join("tweets.js"),
            r#"window.YTD.tweets.part0 = [ { "tweet" : { "id_str" : "200", "created_at" : "Wed Oct 10 20:19:24 +0000 2018" } } ]"#,
        )
        .unwrap();
        let mut store = SqliteStore::in_memory().unwrap();

        let summaries = ingest_paths(&mut store, &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries.iter().map(|s| s.inserted).sum::<usize>(), 3);
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_ingest_zip_follows_index() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("export.zip");
        write_zip(
            &export,
            &[
                (
                    "data/js/tweet_index.js",
                    r#"var tweet_index = [
                      { "file_name" : "data/js/tweets/2014_02.js", "year" : 2014, "month" : 2, "tweet_count" : 1 },
                      { "file_name" : "data/js/tweets/2014_01.js", "year" : 2014, "month" : 1, "tweet_count" : 2 }
                    ]"#,
                ),
                ("data/js/tweets/2014_01.js", MONTH),
                (
                    "data/js/tweets/2014_02.js",
                    r#"Grailbird.data.tweets_2014_02 = [ { "id_str" : "102", "created_at" : "2014-02-01 10:00:00 +0000" } ]"#,
                ),
                (
                    "data/js/tweets/2013_12.js",
                    r#"Grailbird.data.tweets_2013_12 = [ { "id_str" : "99", "created_at" : "2013-12-01 10:00:00 +0000" } ]"#,
                ),
            ],
        );
        let mut store = SqliteStore::in_memory().unwrap();

        let summaries = ingest_paths(&mut store, &[export.clone()]).unwrap();

        let paths: Vec<PathBuf> = summaries.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                export.join("data/js/tweets/2014_02.js"),
                export.join("data/js/tweets/2014_01.js"),
            ]
        );
        assert_eq!(summaries.iter().map(|s| s.inserted).sum::<usize>(), 3);
        assert_eq!(store.get(PostId::new(102)).unwrap().unwrap().state, PostState::ToDelete);
        assert!(store.get(PostId::new(99)).unwrap().is_none());

        let again = ingest_paths(&mut store, &[export]).unwrap();
        assert_eq!(again.iter().map(|s| s.duplicates()).sum::<usize>(), 3);
    }

    #[test]
    fn test_ingest_zip_without_index() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("export.zip");
        write_zip(
            &export,
            &[
                (
                    "data/tweets.js",
                    r#"window.YTD.tweets.part0 = [ { "tweet" : { "id_str" : "300", "created_at" : "Wed Oct 10 20:19:24 +0000 2018" } } ]"#,
                ),
                ("data/like.js", r#"window.YTD.like.part0 = [ { "like" : { "tweetId" : "1" } } ]"#),
            ],
        );
        let mut store = SqliteStore::in_memory().unwrap();

        let summaries = ingest_paths(&mut store, &[dir.path().to_path_buf()]).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].path, export.join("data/tweets.js"));
        assert_eq!(summaries[0].inserted, 1);
        assert_eq!(store.get(PostId::new(300)).unwrap().unwrap().created_at, 1539202764);
    }

    #[test]
    fn test_zip_index_naming_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("export.zip");
        write_zip(
            &export,
            &[(
                "data/js/tweet_index.js",
                r#"var tweet_index = [ { "file_name" : "data/js/tweets/2014_01.js" } ]"#,
            )],
        );
        let mut store = SqliteStore::in_memory().unwrap();

        assert!(matches!(
            ingest_paths(&mut store, &[export]),
            Err(crate::error::CliError::Archive { .. })
        ));
    }

    #[test]
    fn test_broken_file_stops_ingest() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.js");
        fs::write(&file, "Grailbird.data.x = [ {").unwrap();
        let mut store = SqliteStore::in_memory().unwrap();

        assert!(ingest_paths(&mut store, &[file]).is_err());
        assert_eq!(store.counts_by_state().unwrap().total(), 0);
    }
}
