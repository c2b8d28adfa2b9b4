//! Run and per-file results.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::identifier::IdentifierIssue;
use crate::error::Result;

/// Outcome of migrating one input path or one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The file was loaded. Individual records may still have failed.
    Success,

    /// The path was neither a matching file nor a directory holding one.
    SkippedInvalidPath,

    /// The destination table could not be created; no records were written.
    TableCreateFailed,

    /// The file could not be opened or had no header line.
    DecodeFailed,

    /// Writing the record with this 1-based index failed.
    RecordWriteFailed(usize),
}

/// File-level result carried by a [`FileReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Success,
    SkippedInvalidPath,
    TableCreateFailed,
    DecodeFailed,
}

impl From<FileOutcome> for MigrationOutcome {
    fn from(outcome: FileOutcome) -> Self {
        match outcome {
            FileOutcome::Success => MigrationOutcome::Success,
            FileOutcome::SkippedInvalidPath => MigrationOutcome::SkippedInvalidPath,
            FileOutcome::TableCreateFailed => MigrationOutcome::TableCreateFailed,
            FileOutcome::DecodeFailed => MigrationOutcome::DecodeFailed,
        }
    }
}

/// A record that could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// 1-based index among the file's data records.
    pub index: usize,

    /// Leading field of the record, empty if the line could not be decoded.
    pub key: String,

    pub message: String,
}

impl RecordFailure {
    pub fn outcome(&self) -> MigrationOutcome {
        MigrationOutcome::RecordWriteFailed(self.index)
    }
}

/// Result of migrating one file, or of skipping one path.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,

    /// Destination table, `None` for skipped paths.
    pub table: Option<String>,

    pub outcome: FileOutcome,

    /// Why the file-level outcome is not `Success`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Records whose write statement succeeded.
    pub records_written: usize,

    /// Sum of rows affected reported by the server.
    pub rows_affected: u64,

    pub record_failures: Vec<RecordFailure>,

    /// Suspicious names or type clauses found in the header.
    pub issues: Vec<IdentifierIssue>,
}

impl FileReport {
    pub(crate) fn new(path: &Path, table: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            table: Some(table.to_string()),
            outcome: FileOutcome::Success,
            error: None,
            records_written: 0,
            rows_affected: 0,
            record_failures: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub(crate) fn skipped(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            table: None,
            outcome: FileOutcome::SkippedInvalidPath,
            error: Some(reason.into()),
            ..Self::new(path, "")
        }
    }

    pub(crate) fn fail(&mut self, outcome: FileOutcome, message: impl Into<String>) {
        self.outcome = outcome;
        self.error = Some(message.into());
    }

    /// True if the file loaded and every record was written.
    pub fn is_clean(&self) -> bool {
        self.outcome == FileOutcome::Success && self.record_failures.is_empty()
    }

    /// The file-level outcome followed by one outcome per failed record.
    pub fn outcomes(&self) -> Vec<MigrationOutcome> {
        std::iter::once(self.outcome.into())
            .chain(self.record_failures.iter().map(RecordFailure::outcome))
            .collect()
    }
}

/// Aggregate counters over a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTotals {
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub paths_skipped: usize,
    pub records_written: usize,
    pub records_failed: usize,
    pub rows_affected: u64,
}

impl RunTotals {
    fn from_files(files: &[FileReport]) -> Self {
        let mut totals = RunTotals::default();
        for file in files {
            match file.outcome {
                FileOutcome::Success => totals.files_succeeded += 1,
                FileOutcome::SkippedInvalidPath => totals.paths_skipped += 1,
                _ => totals.files_failed += 1,
            }
            totals.records_written += file.records_written;
            totals.records_failed += file.record_failures.len();
            totals.rows_affected += file.rows_affected;
        }
        totals
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Unique run identifier.
    pub run_id: String,

    /// "completed" or "cancelled".
    pub status: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,

    /// One entry per file processed or path skipped, in processing order.
    pub files: Vec<FileReport>,

    pub totals: RunTotals,
}

impl MigrationReport {
    pub(crate) fn finish(
        run_id: String,
        started_at: DateTime<Utc>,
        files: Vec<FileReport>,
        cancelled: bool,
    ) -> Self {
        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let totals = RunTotals::from_files(&files);

        Self {
            run_id,
            status: if cancelled { "cancelled" } else { "completed" }.to_string(),
            started_at,
            completed_at,
            duration_seconds,
            files,
            totals,
        }
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
