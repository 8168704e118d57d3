//! Output formatting for the CLI.

use crate::commands::ingest::IngestSummary;
use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use molt_domain::StateCounts;
use molt_retirer::RunReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format post counts by state and the number of posts due for deletion.
    pub fn format_status(&self, counts: &StateCounts, eligible: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_state: serde_json::Map<String, serde_json::Value> = counts
                    .iter()
                    .map(|(state, count)| (state.as_str().to_string(), count.into()))
                    .collect();
                let json = serde_json::json!({
                    "total": counts.total(),
                    "states": by_state,
                    "eligible": eligible,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["State", "Posts"]);
                for (state, count) in counts.iter() {
                    builder.push_record([state.to_string(), count.to_string()]);
                }
                builder.push_record(["total".to_string(), counts.total().to_string()]);

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let due = format!("Posts to delete now: {}", eligible);
                Ok(format!("{}\n{}", table, self.info(&due)))
            }
        }
    }

    /// Format the report of a retirement run.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<serde_json::Value> = report
                    .failures
                    .iter()
                    .map(|f| serde_json::json!({ "id": f.id.to_string(), "detail": f.detail }))
                    .collect();
                let json = serde_json::json!({
                    "run_id": report.run_id.to_string(),
                    "examined": report.examined,
                    "deleted": report.deleted,
                    "blocked": report.blocked,
                    "still_pending": report.still_pending(),
                    "skipped": report.skipped,
                    "committed": report.committed,
                    "cancelled": report.cancelled,
                    "credentials_rejected": report.credentials_rejected,
                    "dry_run": report.dry_run,
                    "elapsed_secs": report.elapsed.as_secs_f64(),
                    "failures": failures,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let mut out = report.summary();
                out.push('\n');
                if report.credentials_rejected {
                    out.push_str(&self.error("Credentials were rejected; check remote.access_token"));
                } else if report.cancelled {
                    out.push_str(&self.warning("Run cancelled; remaining posts are retried next run"));
                } else if report.dry_run {
                    out.push_str(&self.info(&format!("{} post(s) would be deleted", report.examined)));
                } else if report.is_complete() {
                    out.push_str(&self.success(&format!("Deleted {} post(s)", report.deleted)));
                } else {
                    out.push_str(&self.warning(&format!(
                        "{} post(s) still pending; they are retried next run",
                        report.still_pending()
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format the result of ingesting archive files.
    pub fn format_ingest(&self, files: &[IngestSummary]) -> Result<String> {
        let inserted: usize = files.iter().map(|f| f.inserted).sum();

        match self.format {
            OutputFormat::Json => {
                let json_files: Vec<serde_json::Value> = files
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "path": f.path.display().to_string(),
                            "read": f.read,
                            "inserted": f.inserted,
                            "duplicates": f.duplicates(),
                            "malformed": f.malformed,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "files": json_files,
                    "inserted": inserted,
                }))?)
            }
            OutputFormat::Table => {
                if files.is_empty() {
                    return Ok(self.colorize("No archive files found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["File", "Read", "New", "Duplicates", "Malformed"]);
                for f in files {
                    builder.push_record([
                        f.path.display().to_string(),
                        f.read.to_string(),
                        f.inserted.to_string(),
                        f.duplicates().to_string(),
                        f.malformed.to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let done = self.success(&format!("Loaded {} new post(s)", inserted));
                Ok(format!("{}\n{}", table, done))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
