//! Join one variant's predictions onto ground truth

use crate::error::EvalError;
use crate::table::{format_number, has_extension, list_files, parse_number, Table};
use crate::truth::{GroundTruth, FILENAME_COLUMN, TRUTH_COLUMN};
use headcount_domain::EvaluationRow;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix of every evaluation output file
pub const RESULTS_PREFIX: &str = "results_";

/// Column holding predicted counts
pub const PREDICTION_COLUMN: &str = "number_of_people";

/// Column holding per-row accuracy
pub const ACCURACY_COLUMN: &str = "accuracy_percent";

/// Name of the evaluation file for `variant`
pub fn results_file_name(variant: &str) -> String {
    format!("{}{}.csv", RESULTS_PREFIX, variant)
}

/// What one evaluated prediction file produced
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Variant name (prediction file stem)
    pub variant: String,

    /// Evaluation table written
    pub output: PathBuf,

    /// Rows written (equals prediction rows read)
    pub rows: usize,

    /// Rows whose accuracy is not applicable
    pub not_applicable: usize,
}

/// Left-joins prediction tables onto a [`GroundTruth`]
#[derive(Debug, Clone)]
pub struct Evaluator {
    truth: GroundTruth,
}

impl Evaluator {
    /// Create an evaluator over `truth`
    pub fn new(truth: GroundTruth) -> Self {
        Self { truth }
    }

    /// Evaluate a prediction table
    ///
    /// The first column is the filename and the second the prediction. Every
    /// prediction row yields one output row, in order, duplicates included.
    pub fn evaluate(&self, predictions: &Table, label: &str) -> Result<Vec<EvaluationRow>, EvalError> {
        if predictions.headers().len() < 2 {
            return Err(EvalError::MissingColumn {
                file: label.to_string(),
                column: PREDICTION_COLUMN.to_string(),
            });
        }

        Ok(predictions
            .column(0)
            .zip(predictions.column(1))
            .map(|(filename, predicted)| {
                let filename = filename.trim();
                EvaluationRow::new(filename, parse_number(predicted), self.truth.get(filename))
            })
            .collect())
    }

    /// Evaluate one prediction file into `results_dir`
    pub fn evaluate_file(&self, predictions: &Path, results_dir: &Path) -> Result<EvaluationReport, EvalError> {
        let variant = predictions
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = Table::read(predictions)?;
        let rows = self.evaluate(&table, &predictions.display().to_string())?;

        let output = results_dir.join(results_file_name(&variant));
        evaluation_table(&rows).write_csv(&output)?;

        let not_applicable = rows.iter().filter(|r| r.accuracy.value().is_none()).count();
        info!(
            "Evaluated {}: {} rows ({} N/A) -> {}",
            variant,
            rows.len(),
            not_applicable,
            output.display()
        );

        Ok(EvaluationReport {
            variant,
            output,
            rows: rows.len(),
            not_applicable,
        })
    }

    /// Evaluate every `*.csv` prediction file in `predictions_dir`, in name order
    ///
    /// A file that cannot be read or lacks columns is skipped with a warning.
    pub fn evaluate_dir(&self, predictions_dir: &Path, results_dir: &Path) -> Result<Vec<EvaluationReport>, EvalError> {
        let mut reports = Vec::new();
        for path in list_files(predictions_dir)? {
            if !has_extension(&path, &["csv"]) {
                continue;
            }
            match self.evaluate_file(&path, results_dir) {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(reports)
    }
}

/// Render evaluation rows as a table
pub fn evaluation_table(rows: &[EvaluationRow]) -> Table {
    let headers = vec![
        FILENAME_COLUMN.to_string(),
        PREDICTION_COLUMN.to_string(),
        TRUTH_COLUMN.to_string(),
        ACCURACY_COLUMN.to_string(),
    ];
    let rows = rows
        .iter()
        .map(|row| {
            vec![
                row.filename.clone(),
                format_number(row.predicted),
                format_number(row.truth),
                row.accuracy.to_string(),
            ]
        })
        .collect();
    Table::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headcount_domain::{Accuracy, GroundTruthRecord};
    use std::fs;
    use tempfile::TempDir;

    fn truth() -> GroundTruth {
        GroundTruth::from_records(vec![
            GroundTruthRecord::new("a.txt", Some(10.0)),
            GroundTruthRecord::new("b.txt", Some(0.0)),
            GroundTruthRecord::new("c.txt", None),
        ])
    }

    fn predictions(rows: &[(&str, &str)]) -> Table {
        Table::new(
            vec!["filename".to_string(), "number_of_people".to_string()],
            rows.iter()
                .map(|(f, n)| vec![f.to_string(), n.to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_accuracy_rules() {
        let evaluator = Evaluator::new(truth());
        let rows = evaluator
            .evaluate(
                &predictions(&[("a.txt", "5"), ("b.txt", "3"), ("c.txt", "2"), ("d.txt", "1")]),
                "p.csv",
            )
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].accuracy, Accuracy::Percent(50.0));
        assert_eq!(rows[1].accuracy, Accuracy::NotApplicable);
        assert_eq!(rows[2].accuracy, Accuracy::NotApplicable);
        assert_eq!(rows[3].truth, None);
        assert_eq!(rows[3].accuracy, Accuracy::NotApplicable);
    }

    #[test]
    fn test_duplicates_and_non_numeric_kept() {
        let evaluator = Evaluator::new(truth());
        let rows = evaluator
            .evaluate(&predictions(&[("a.txt", "5"), ("a.txt", "oops")]), "p.csv")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].predicted, None);
        assert_eq!(rows[1].accuracy, Accuracy::NotApplicable);
    }

    #[test]
    fn test_evaluate_file_writes_results() {
        let dir = TempDir::new().unwrap();
        let predictions_path = dir.path().join("phi4.csv");
        fs::write(&predictions_path, "filename,number_of_people\na.txt,5\nb.txt,0\n").unwrap();
        let results_dir = dir.path().join("results");

        let report = Evaluator::new(truth())
            .evaluate_file(&predictions_path, &results_dir)
            .unwrap();

        assert_eq!(report.variant, "phi4");
        assert_eq!(report.rows, 2);
        assert_eq!(report.not_applicable, 1);
        assert_eq!(report.output, results_dir.join("results_phi4.csv"));

        let content = fs::read_to_string(&report.output).unwrap();
        assert_eq!(
            content,
            "filename,number_of_people,truth,accuracy_percent\na.txt,5,10,50\nb.txt,0,0,N/A\n"
        );
    }

    #[test]
    fn test_evaluate_dir_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        let predictions_dir = dir.path().join("predictions");
        fs::create_dir(&predictions_dir).unwrap();
        fs::write(predictions_dir.join("b.csv"), "filename,number_of_people\na.txt,10\n").unwrap();
        fs::write(predictions_dir.join("a.csv"), "filename,number_of_people\na.txt,1\n").unwrap();
        fs::write(predictions_dir.join("single.csv"), "filename\na.txt\n").unwrap();
        fs::write(predictions_dir.join("notes.txt"), "ignored").unwrap();

        let reports = Evaluator::new(truth())
            .evaluate_dir(&predictions_dir, &dir.path().join("results"))
            .unwrap();

        let variants: Vec<&str> = reports.iter().map(|r| r.variant.as_str()).collect();
        assert_eq!(variants, vec!["a", "b"]);
    }
}
