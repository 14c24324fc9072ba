//! Headcount Evaluation Engine
//!
//! Scores prediction tables against hand-labelled ground truth.
//!
//! # Views
//!
//! - [`Evaluator`]: per-variant left join with per-row accuracy
//! - [`GlobalMetrics`]: MAE / MSE / RMSE / R² / bias over every evaluation
//!   table, with a best performer
//! - [`WideComparison`]: every raw prediction file side by side, with
//!   per-variant absolute error
//!
//! The two aggregate views read different inputs and apply their own
//! missing-data rules: `GlobalMetrics` skips a whole variant when any
//! prediction is missing, while `WideComparison` drops missing cells from
//! the mean.
//!
//! # Example
//!
//! ```
//! use headcount_eval::{Evaluator, GroundTruth, Table};
//! use headcount_domain::{Accuracy, GroundTruthRecord};
//!
//! let truth = GroundTruth::from_records(vec![GroundTruthRecord::new("a.txt", Some(10.0))]);
//! let predictions = Table::new(
//!     vec!["filename".into(), "number_of_people".into()],
//!     vec![vec!["a.txt".into(), "5".into()]],
//! );
//!
//! let rows = Evaluator::new(truth).evaluate(&predictions, "mistral2.csv").unwrap();
//! assert_eq!(rows[0].accuracy, Accuracy::Percent(50.0));
//! ```

#![warn(missing_docs)]

mod error;
pub mod evaluator;
pub mod metrics;
pub mod table;
pub mod truth;
pub mod wide;

pub use error::EvalError;
pub use evaluator::{evaluation_table, results_file_name, EvaluationReport, Evaluator};
pub use metrics::{compute_metrics, score_table, GlobalMetrics, MetricsReport, SkippedFile};
pub use table::{Table, TableFormat};
pub use truth::GroundTruth;
pub use wide::{load_variants, VariantPredictions, WideComparison, WideRow};
