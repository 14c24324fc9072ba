//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Variant name not present in the configuration
    #[error("Unknown variant '{name}' (available: {available})")]
    UnknownVariant {
        /// Requested name
        name: String,
        /// Comma-separated configured names
        available: String,
    },

    /// Model client error
    #[error(transparent)]
    Llm(#[from] headcount_llm::LlmError),

    /// Extraction run error
    #[error(transparent)]
    Extractor(#[from] headcount_extractor::ExtractorError),

    /// Evaluation error
    #[error(transparent)]
    Eval(#[from] headcount_eval::EvalError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}
