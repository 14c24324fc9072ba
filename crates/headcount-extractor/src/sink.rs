//! Persistent per-variant prediction tables

use crate::config::WritePolicy;
use crate::error::ExtractorError;
use headcount_domain::{ExtractionRecord, ResultSink};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding the document filename
pub const FILENAME_COLUMN: &str = "filename";

/// Column holding the predicted count
pub const COUNT_COLUMN: &str = "number_of_people";

/// Optional column holding the extracted/fallback flag
pub const STATUS_COLUMN: &str = "status";

/// CSV-backed result sink for one variant
///
/// The header row is written once, when the file is created (or found
/// empty). Under [`WritePolicy::Append`] every record becomes a new row, so
/// rerunning a variant duplicates filenames. Under [`WritePolicy::Upsert`]
/// an existing row for the same filename is replaced in place.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    path: PathBuf,
    policy: WritePolicy,
    record_status: bool,
}

impl CsvResultSink {
    /// Create a sink writing to `path` (nothing is touched until the first append)
    pub fn new(path: impl Into<PathBuf>, policy: WritePolicy, record_status: bool) -> Self {
        Self {
            path: path.into(),
            policy,
            record_status,
        }
    }

    /// Path of the underlying CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn header(&self) -> Vec<&'static str> {
        let mut header = vec![FILENAME_COLUMN, COUNT_COLUMN];
        if self.record_status {
            header.push(STATUS_COLUMN);
        }
        header
    }

    fn row(&self, record: &ExtractionRecord) -> Vec<String> {
        let mut row = vec![record.filename.clone(), record.number_of_people.to_string()];
        if self.record_status {
            row.push(record.status.to_string());
        }
        row
    }

    fn is_new_table(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }

    fn ensure_parent_dir(&self) -> Result<(), ExtractorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn append_row(&self, record: &ExtractionRecord) -> Result<(), ExtractorError> {
        self.ensure_parent_dir()?;
        let write_header = self.is_new_table();

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if write_header {
            writer.write_record(self.header())?;
        }
        writer.write_record(self.row(record))?;
        writer.flush()?;
        Ok(())
    }

    fn upsert_row(&self, record: &ExtractionRecord) -> Result<(), ExtractorError> {
        if self.is_new_table() {
            return self.append_row(record);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let width = self.header().len();
        let new_row = self.row(record);

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut replaced = false;
        for existing in reader.records() {
            let existing = existing?;
            if existing.get(0) == Some(record.filename.as_str()) {
                if !replaced {
                    rows.push(new_row.clone());
                    replaced = true;
                }
                // Later duplicates from earlier append runs collapse into one row
                continue;
            }
            let mut fields: Vec<String> = existing.iter().take(width).map(str::to_string).collect();
            fields.resize(width, String::new());
            rows.push(fields);
        }
        if !replaced {
            rows.push(new_row);
        }
        debug!(
            "Upserting {} into {} ({})",
            record.filename,
            self.path.display(),
            if replaced { "replaced" } else { "appended" }
        );

        // Write beside the target, then rename over it
        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.write_record(self.header())?;
            for row in &rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl ResultSink for CsvResultSink {
    type Error = ExtractorError;

    fn append(&mut self, record: &ExtractionRecord) -> Result<(), Self::Error> {
        match self.policy {
            WritePolicy::Append => self.append_row(record),
            WritePolicy::Upsert => self.upsert_row(record),
        }
    }
}

/// In-memory sink, mostly for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Records in append order
    pub records: Vec<ExtractionRecord>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    type Error = ExtractorError;

    fn append(&mut self, record: &ExtractionRecord) -> Result<(), Self::Error> {
        self.records.push(record.clone());
        Ok(())
    }
}
