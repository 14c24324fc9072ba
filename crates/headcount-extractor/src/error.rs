//! Error types for the Extractor

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an extraction run
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Result sink could not persist a record
    #[error("Sink error: {0}")]
    Sink(String),

    /// Corpus directory does not exist or is not a directory
    #[error("Corpus directory not found: {}", .0.display())]
    CorpusNotFound(PathBuf),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Typed failure to recover a record from a model completion
///
/// The pipeline recovers from both variants by writing a sentinel record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No JSON object could be located or parsed
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// JSON parsed but does not carry a usable people count
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}
