//! Error types for the evaluation engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or scoring tables
#[derive(Error, Debug)]
pub enum EvalError {
    /// A required column is absent
    #[error("{file}: missing required column '{column}'")]
    MissingColumn {
        /// Table the column was looked up in
        file: String,
        /// Column name
        column: String,
    },

    /// Predicted values are missing on some rows
    #[error("{file}: {count} rows have no numeric prediction")]
    NullPrediction {
        /// Table holding the gaps
        file: String,
        /// Number of rows without a numeric prediction
        count: usize,
    },

    /// No row carries both a prediction and a truth value
    #[error("{0}: no rows matched the ground truth")]
    NoMatchedRows(String),

    /// CSV decoding or encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook decoding error
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File extension is not a known table format
    #[error("Unsupported table format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl From<calamine::Error> for EvalError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err.to_string())
    }
}
