//! Evaluation module - per-row accuracy and per-variant error statistics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker rendered in place of an accuracy that cannot be computed
pub const NOT_APPLICABLE: &str = "N/A";

/// Per-row accuracy of a prediction relative to its ground truth
///
/// Accuracy is `predicted / truth * 100`, rounded to two decimals. It is only
/// defined when the truth is present and non-zero and a prediction exists;
/// every other case is the explicit `NotApplicable` marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accuracy {
    /// Accuracy as a percentage of the true count
    Percent(f64),

    /// Truth missing or zero, or prediction missing
    NotApplicable,
}

impl Accuracy {
    /// Compute the accuracy for one prediction
    ///
    /// # Examples
    ///
    /// ```
    /// use headcount_domain::Accuracy;
    ///
    /// assert_eq!(Accuracy::compute(Some(5.0), Some(10.0)), Accuracy::Percent(50.0));
    /// assert_eq!(Accuracy::compute(Some(5.0), Some(0.0)), Accuracy::NotApplicable);
    /// assert_eq!(Accuracy::compute(Some(5.0), None), Accuracy::NotApplicable);
    /// ```
    pub fn compute(predicted: Option<f64>, truth: Option<f64>) -> Self {
        match (predicted, truth) {
            (Some(predicted), Some(truth)) if truth != 0.0 && truth.is_finite() => {
                Accuracy::Percent(round2(predicted / truth * 100.0))
            }
            _ => Accuracy::NotApplicable,
        }
    }

    /// Get the numeric value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Accuracy::Percent(value) => Some(*value),
            Accuracy::NotApplicable => None,
        }
    }

    /// Parse an accuracy cell written by [`fmt::Display`]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(NOT_APPLICABLE) {
            return Some(Accuracy::NotApplicable);
        }
        s.parse::<f64>().ok().map(Accuracy::Percent)
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accuracy::Percent(value) => write!(f, "{}", value),
            Accuracy::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A prediction left-joined to its ground truth
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRow {
    /// Document filename
    pub filename: String,

    /// Predicted count (missing when the prediction cell was not numeric)
    pub predicted: Option<f64>,

    /// True count (missing when unlabelled or unmatched)
    pub truth: Option<f64>,

    /// Accuracy of the prediction
    pub accuracy: Accuracy,
}

impl EvaluationRow {
    /// Build a row, deriving the accuracy from the prediction and truth
    pub fn new(filename: impl Into<String>, predicted: Option<f64>, truth: Option<f64>) -> Self {
        Self {
            filename: filename.into(),
            predicted,
            truth,
            accuracy: Accuracy::compute(predicted, truth),
        }
    }
}

/// Aggregate regression statistics for one variant
///
/// Serialized field names match the columns of the aggregate metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Label of the evaluated variant (its evaluation file name)
    pub file: String,

    /// Mean absolute error
    #[serde(rename = "MAE")]
    pub mae: f64,

    /// Mean squared error
    #[serde(rename = "MSE")]
    pub mse: f64,

    /// Root mean squared error
    #[serde(rename = "RMSE")]
    pub rmse: f64,

    /// Coefficient of determination
    #[serde(rename = "R2")]
    pub r2: f64,

    /// Mean signed error (positive means over-counting)
    pub bias: f64,
}
