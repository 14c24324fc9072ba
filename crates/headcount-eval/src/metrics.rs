//! Aggregate regression metrics across evaluated variants

use crate::error::EvalError;
use crate::evaluator::PREDICTION_COLUMN;
use crate::table::{has_extension, list_files, Table};
use crate::truth::TRUTH_COLUMN;
use headcount_domain::ModelMetrics;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extensions read from the results directory
pub const RESULT_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "ods"];

/// Compute metrics over `(predicted, truth)` pairs
///
/// Returns `None` for an empty slice. R² follows the usual convention for a
/// constant truth vector: 1.0 on a perfect fit, 0.0 otherwise.
pub fn compute_metrics(file: &str, pairs: &[(f64, f64)]) -> Option<ModelMetrics> {
    if pairs.is_empty() {
        return None;
    }
    let n = pairs.len() as f64;

    let mae = pairs.iter().map(|(p, t)| (p - t).abs()).sum::<f64>() / n;
    let ss_res = pairs.iter().map(|(p, t)| (p - t).powi(2)).sum::<f64>();
    let mse = ss_res / n;
    let bias = pairs.iter().map(|(p, t)| p - t).sum::<f64>() / n;

    let mean_truth = pairs.iter().map(|(_, t)| t).sum::<f64>() / n;
    let ss_tot = pairs.iter().map(|(_, t)| (t - mean_truth).powi(2)).sum::<f64>();
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(ModelMetrics {
        file: file.to_string(),
        mae,
        mse,
        rmse: mse.sqrt(),
        r2,
        bias,
    })
}

/// Score one evaluation table
///
/// # Errors
///
/// - `MissingColumn` when `truth` or `number_of_people` is absent
/// - `NullPrediction` when any predicted cell is not numeric
/// - `NoMatchedRows` when no row has a truth value
pub fn score_table(file: &str, table: &Table) -> Result<ModelMetrics, EvalError> {
    let missing = |column: &str| EvalError::MissingColumn {
        file: file.to_string(),
        column: column.to_string(),
    };
    let truth_idx = table.column_index(TRUTH_COLUMN).ok_or_else(|| missing(TRUTH_COLUMN))?;
    let pred_idx = table
        .column_index(PREDICTION_COLUMN)
        .ok_or_else(|| missing(PREDICTION_COLUMN))?;

    let predicted: Vec<Option<f64>> = table.numeric_column(pred_idx).collect();
    let nulls = predicted.iter().filter(|p| p.is_none()).count();
    if nulls > 0 {
        return Err(EvalError::NullPrediction {
            file: file.to_string(),
            count: nulls,
        });
    }

    let pairs: Vec<(f64, f64)> = predicted
        .into_iter()
        .zip(table.numeric_column(truth_idx))
        .filter_map(|(p, t)| Some((p?, t?)))
        .collect();

    compute_metrics(file, &pairs).ok_or_else(|| EvalError::NoMatchedRows(file.to_string()))
}

/// A results file left out of the ranking
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    /// File name
    pub file: String,

    /// Why it was skipped
    pub reason: String,
}

/// Metrics for every qualifying variant plus the files that did not qualify
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsReport {
    /// One row per qualifying file, in file-name order
    pub metrics: Vec<ModelMetrics>,

    /// Files skipped, in file-name order
    pub skipped: Vec<SkippedFile>,
}

impl MetricsReport {
    /// The variant with the lowest MAE (first one on ties)
    pub fn best(&self) -> Option<&ModelMetrics> {
        self.metrics
            .iter()
            .fold(None, |best: Option<&ModelMetrics>, m| match best {
                Some(b) if b.mae <= m.mae => Some(b),
                _ => Some(m),
            })
    }

    /// Whether no file qualified
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Write `file,MAE,MSE,RMSE,R2,bias` rows to `path`
    pub fn write_csv(&self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(path)?;
        for metrics in &self.metrics {
            writer.serialize(metrics)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Scores every evaluation table in a results directory
#[derive(Debug, Clone)]
pub struct GlobalMetrics {
    results_dir: PathBuf,
}

impl GlobalMetrics {
    /// Create a scorer over `results_dir`
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Score every supported table, in file-name order
    ///
    /// Unreadable or non-qualifying files are recorded in
    /// [`MetricsReport::skipped`] and logged; they never fail the run.
    pub fn run(&self) -> Result<MetricsReport, EvalError> {
        let mut report = MetricsReport::default();

        for path in list_files(&self.results_dir)? {
            if !has_extension(&path, RESULT_EXTENSIONS) {
                info!("Skipping {}: unsupported file format", path.display());
                continue;
            }
            let file = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            let scored = Table::read(&path).and_then(|table| score_table(&file, &table));
            match scored {
                Ok(metrics) => {
                    info!("Scored {}: MAE {:.3}", file, metrics.mae);
                    report.metrics.push(metrics);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file, e);
                    report.skipped.push(SkippedFile {
                        file,
                        reason: e.to_string(),
                    });
                }
            }
        }

        match report.best() {
            Some(best) => info!("Best performer: {} (MAE {:.3})", best.file, best.mae),
            None => info!("No results file qualified for metrics"),
        }
        Ok(report)
    }
}
