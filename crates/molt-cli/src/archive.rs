//! Reading post archives into `(id, created_at)` pairs.
//!
//! Archive exports wrap a JSON array in a JavaScript assignment, e.g.
//! `window.YTD.tweets.part0 = [ { "tweet": { ... } } ]` or the older
//! `Grailbird.data.tweets_2014_01 = [ { ... } ]`. Plain JSON arrays are
//! accepted as well.
//!
//! A zipped export is read in place. Its `data/js/tweet_index.js` names the
//! monthly post files; exports without an index fall back to the post files
//! found under `data/`.

use crate::error::{CliError, Result};
use chrono::DateTime;
use molt_domain::PostId;
use serde::Deserialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S %z", "%a %b %d %H:%M:%S %z %Y"];

/// Index of monthly post files inside a zipped export
const ZIP_INDEX: &str = "data/js/tweet_index.js";

/// Posts read from one archive file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveBatch {
    /// Posts with a usable id and creation time
    pub posts: Vec<(PostId, u64)>,

    /// Entries skipped because the id or date could not be read
    pub malformed: usize,
}

/// Parse the contents of one archive file.
pub fn parse_archive(path: &Path, contents: &str) -> Result<ArchiveBatch> {
    let json = strip_assignment(contents);
    let entries: Vec<Value> = serde_json::from_str(json).map_err(|e| CliError::Archive {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut batch = ArchiveBatch::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_entry(entry) {
            Some(post) => batch.posts.push(post),
            None => {
                tracing::warn!(file = %path.display(), index, "Skipping archive entry without a usable id or date");
                batch.malformed += 1;
            }
        }
    }

    Ok(batch)
}

/// Read and parse one archive file.
pub fn read_archive(path: &Path) -> Result<ArchiveBatch> {
    let contents = fs::read_to_string(path)?;
    parse_archive(path, &contents)
}

/// Expand files and directories into the archive files they contain, in a stable order.
pub fn collect_archive_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut files)?;
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(CliError::InvalidInput(format!("{} does not exist", path.display())));
        }
    }
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_dir(&path, files)?;
        } else if is_archive_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_archive_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js") | Some("json") | Some("zip")
    )
}

/// Whether `path` is a zipped export rather than a single archive file.
pub fn is_zip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("zip")
}

#[derive(Deserialize)]
struct IndexEntry {
    file_name: String,
}

/// A zipped archive export opened for reading
pub struct ZipExport {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ZipExport {
    /// Open the zip file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|e| zip_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Entries holding posts, in index order when the export has an index.
    pub fn post_files(&mut self) -> Result<Vec<String>> {
        if self.archive.index_for_name(ZIP_INDEX).is_some() {
            let contents = self.read_entry_text(ZIP_INDEX)?;
            let index: Vec<IndexEntry> =
                serde_json::from_str(strip_assignment(&contents)).map_err(|e| CliError::Archive {
                    path: self.entry_path(ZIP_INDEX),
                    reason: e.to_string(),
                })?;
            return Ok(index.into_iter().map(|entry| entry.file_name).collect());
        }

        tracing::debug!(archive = %self.path.display(), "No post index, scanning entries");
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| is_post_entry(name))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Read and parse one entry of the export.
    pub fn read_entry(&mut self, name: &str) -> Result<ArchiveBatch> {
        let contents = self.read_entry_text(name)?;
        parse_archive(&self.entry_path(name), &contents)
    }

    /// Display path of an entry, e.g. `export.zip/data/js/tweets/2014_01.js`.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn read_entry_text(&mut self, name: &str) -> Result<String> {
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|e| zip_error(&self.path.join(name), e))?;
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        Ok(contents)
    }
}

/// Legacy monthly files under `data/js/tweets/`, or `data/tweets.js` and its parts.
fn is_post_entry(name: &str) -> bool {
    if !name.ends_with(".js") {
        return false;
    }
    if let Some(rest) = name.strip_prefix("data/js/tweets/") {
        return !rest.contains('/');
    }
    match name.strip_prefix("data/") {
        Some(file) => file == "tweet.js" || file == "tweets.js" || file.starts_with("tweets-part"),
        None => false,
    }
}

fn zip_error(path: &Path, err: ZipError) -> CliError {
    CliError::Archive {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Drop a leading `name =` assignment and a trailing semicolon.
fn strip_assignment(contents: &str) -> &str {
    let trimmed = contents.trim_start_matches('\u{feff}').trim();
    let body = if trimmed.starts_with('[') {
        trimmed
    } else {
        match trimmed.find('=') {
            Some(pos) => trimmed[pos + 1..].trim_start(),
            None => trimmed,
        }
    };
    body.trim_end().trim_end_matches(';')
}

fn parse_entry(entry: &Value) -> Option<(PostId, u64)> {
    let post = entry.get("tweet").unwrap_or(entry);

    let id = match post.get("id_str").or_else(|| post.get("id"))? {
        Value::String(s) => PostId::parse(s).ok()?,
        Value::Number(n) => PostId::new(n.as_u64()?),
        _ => return None,
    };

    let created_at = match post.get("created_at")? {
        Value::String(s) => parse_date(s)?,
        Value::Number(n) => n.as_u64()?,
        _ => return None,
    };

    Some((id, created_at))
}

/// Parse an archive timestamp into seconds since the Unix epoch.
pub fn parse_date(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())?;

    u64::try_from(parsed.timestamp()).ok()
}
