//! Outcome types for extraction runs

use headcount_domain::ExtractionRecord;
use std::collections::BTreeMap;
use std::fmt;

/// Why a document fell back to the sentinel record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// The model service could not be reached or refused the request
    Transport,

    /// The service answered with no usable content
    EmptyResponse,

    /// No JSON object could be located or parsed
    MalformedJson,

    /// JSON parsed but carried no valid people count
    SchemaViolation,
}

impl FailureKind {
    /// Get the failure name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::EmptyResponse => "empty_response",
            FailureKind::MalformedJson => "malformed_json",
            FailureKind::SchemaViolation => "schema_violation",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered failure for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Failure category
    pub kind: FailureKind,

    /// Human-readable cause
    pub message: String,
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// The record that was persisted (sentinel on failure)
    pub record: ExtractionRecord,

    /// Set when the record is the sentinel
    pub failure: Option<DocumentFailure>,
}

impl DocumentOutcome {
    /// Whether the count came from the model
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of one variant run over a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Variant name
    pub variant: String,

    /// Documents processed (equals rows written)
    pub documents: usize,

    /// Documents whose count came from the model
    pub extracted: usize,

    /// Sentinel records per failure kind
    pub failures: BTreeMap<FailureKind, usize>,

    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Create an empty summary for `variant`
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            ..Default::default()
        }
    }

    /// Account for one processed document
    pub fn record(&mut self, outcome: &DocumentOutcome) {
        self.documents += 1;
        match &outcome.failure {
            None => self.extracted += 1,
            Some(failure) => *self.failures.entry(failure.kind).or_insert(0) += 1,
        }
    }

    /// Total sentinel records written
    pub fn fallback_count(&self) -> usize {
        self.failures.values().sum()
    }

    /// Sentinel records of one kind
    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} documents, {} extracted, {} fallback",
            self.variant,
            self.documents,
            self.extracted,
            self.fallback_count()
        )?;
        if !self.failures.is_empty() {
            let parts: Vec<String> = self
                .failures
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        write!(f, " in {} ms", self.elapsed_ms)
    }
}
