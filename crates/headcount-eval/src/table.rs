//! Tabular I/O over CSV files and spreadsheet workbooks
//!
//! Every table is read as text: a header row followed by data rows. Numeric
//! coercion happens per column through [`parse_number`], so a non-numeric
//! cell becomes a missing value instead of an error.

use crate::error::EvalError;
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a table file is decoded, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated text
    Csv,
    /// Spreadsheet read through calamine (first sheet)
    Workbook,
}

impl TableFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(TableFormat::Workbook),
            _ => None,
        }
    }
}

/// An in-memory table of text cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table; short rows are padded with empty cells
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a table, picking the decoder from the file extension
    pub fn read(path: &Path) -> Result<Self, EvalError> {
        match TableFormat::from_path(path) {
            Some(TableFormat::Csv) => Self::read_csv(path),
            Some(TableFormat::Workbook) => Self::read_workbook(path),
            None => Err(EvalError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Read a CSV file whose first row is the header
    pub fn read_csv(path: &Path) -> Result<Self, EvalError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self::new(headers, rows))
    }

    /// Read the first sheet of a workbook whose first row is the header
    pub fn read_workbook(path: &Path) -> Result<Self, EvalError> {
        let mut workbook = open_workbook_auto(path)?;
        let Some(sheet) = workbook.sheet_names().first().cloned() else {
            return Ok(Self::default());
        };
        let range = workbook.worksheet_range(&sheet)?;

        let mut cells = range
            .rows()
            .map(|row| row.iter().map(format_cell).collect::<Vec<String>>());
        let headers = cells.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = cells.collect();

        debug!(
            "Read {} rows from sheet '{}' of {}",
            rows.len(),
            sheet,
            path.display()
        );
        Ok(Self::new(headers, rows))
    }

    /// Write the table as CSV, creating parent directories as needed
    pub fn write_csv(&self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named `name` (trimmed, case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// Cells of column `index`; rows too short yield empty strings
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Cells of column `index` coerced to numbers
    pub fn numeric_column(&self, index: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.column(index).map(parse_number)
    }
}

/// Coerce a cell to a finite number; anything else is missing
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render an optional number as a cell; missing values are empty
pub fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Regular files in `dir`, sorted by name
pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>, EvalError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Whether `path` ends in one of `extensions` (case-insensitive)
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

fn format_cell(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}
