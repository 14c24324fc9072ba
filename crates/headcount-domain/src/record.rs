//! Record module - extraction output and ground truth rows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a persisted count came from the model or from the fallback path
///
/// A fallback record always carries a count of zero, which is otherwise
/// indistinguishable from a genuine "nobody" answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// The count was parsed from the model response
    Extracted,

    /// Parsing or transport failed; the count is the zero sentinel
    Fallback,
}

impl ExtractionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Extracted => "extracted",
            ExtractionStatus::Fallback => "fallback",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "extracted" => Some(ExtractionStatus::Extracted),
            "fallback" => Some(ExtractionStatus::Fallback),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extraction result for a (document, variant) pair
///
/// Created once by the pipeline and appended to the variant's sink.
/// Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Document filename supplied by the pipeline (not the model's echo)
    pub filename: String,

    /// Number of people present in the outing
    pub number_of_people: u32,

    /// Origin of the count
    pub status: ExtractionStatus,
}

impl ExtractionRecord {
    /// Create a record for a count parsed from the model response
    pub fn extracted(filename: impl Into<String>, number_of_people: u32) -> Self {
        Self {
            filename: filename.into(),
            number_of_people,
            status: ExtractionStatus::Extracted,
        }
    }

    /// Create the zero-count sentinel written when extraction fails
    ///
    /// # Examples
    ///
    /// ```
    /// use headcount_domain::{ExtractionRecord, ExtractionStatus};
    ///
    /// let record = ExtractionRecord::fallback("b.txt");
    /// assert_eq!(record.number_of_people, 0);
    /// assert_eq!(record.status, ExtractionStatus::Fallback);
    /// ```
    pub fn fallback(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            number_of_people: 0,
            status: ExtractionStatus::Fallback,
        }
    }

    /// Check whether this record is the failure sentinel
    pub fn is_fallback(&self) -> bool {
        self.status == ExtractionStatus::Fallback
    }
}

/// Hand-labelled people count for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    /// Document filename
    pub filename: String,

    /// Correct count, or `None` when the label is missing or non-numeric
    pub truth: Option<f64>,
}

impl GroundTruthRecord {
    /// Create a new ground truth record
    pub fn new(filename: impl Into<String>, truth: Option<f64>) -> Self {
        Self {
            filename: filename.into(),
            truth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in [ExtractionStatus::Extracted, ExtractionStatus::Fallback] {
            assert_eq!(ExtractionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExtractionStatus::parse(" Fallback "), Some(ExtractionStatus::Fallback));
        assert_eq!(ExtractionStatus::parse("unknown"), None);
    }

    #[test]
    fn test_extracted_record() {
        let record = ExtractionRecord::extracted("a.txt", 4);
        assert_eq!(record.number_of_people, 4);
        assert!(!record.is_fallback());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ExtractionStatus::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
    }
}
