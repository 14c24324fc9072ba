//! Wide comparison of raw prediction files
//!
//! Every variant's prediction table becomes one column of a single table
//! keyed by filename, next to the ground truth and one absolute-error column
//! per variant.

use crate::error::EvalError;
use crate::table::{format_number, has_extension, list_files, parse_number, Table};
use crate::truth::{GroundTruth, FILENAME_COLUMN, TRUTH_COLUMN};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Prefix of the per-variant error columns
pub const ERROR_PREFIX: &str = "error_";

/// One variant's predictions keyed by filename
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantPredictions {
    /// Variant name (file stem)
    pub name: String,

    /// Prediction per filename; non-numeric cells are `None`
    pub values: BTreeMap<String, Option<f64>>,
}

impl VariantPredictions {
    /// Build from a table: first column filename, second prediction
    ///
    /// When a filename repeats, the last row wins.
    pub fn from_table(name: impl Into<String>, table: &Table) -> Self {
        let name = name.into();
        let mut values = BTreeMap::new();
        for (filename, cell) in table.column(0).zip(table.column(1)) {
            let filename = filename.trim();
            if filename.is_empty() {
                continue;
            }
            if values.insert(filename.to_string(), parse_number(cell)).is_some() {
                debug!("{}: duplicate row for {}; keeping the last", name, filename);
            }
        }
        Self { name, values }
    }

    /// Load one prediction file; the variant name is the file stem
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = Table::read(path)?;
        Ok(Self::from_table(name, &table))
    }
}

/// Load every `*.csv` prediction file in `dir`, in name order
///
/// Files whose stem collides with a fixed column of the wide table
/// (`filename`, `truth`, or anything starting with `error_`) are skipped.
pub fn load_variants(dir: &Path) -> Result<Vec<VariantPredictions>, EvalError> {
    let mut variants = Vec::new();
    for path in list_files(dir)? {
        if !has_extension(&path, &["csv"]) {
            continue;
        }
        let variant = VariantPredictions::load(&path)?;
        if is_reserved_name(&variant.name) {
            warn!(
                "Skipping {}: '{}' is a reserved column name",
                path.display(),
                variant.name
            );
            continue;
        }
        variants.push(variant);
    }
    info!("Loaded {} prediction files from {}", variants.len(), dir.display());
    Ok(variants)
}

fn is_reserved_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == FILENAME_COLUMN || lower == TRUTH_COLUMN || lower.starts_with(ERROR_PREFIX)
}

/// One filename across every variant
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    /// Document filename
    pub filename: String,

    /// Prediction per variant, in variant order
    pub predictions: Vec<Option<f64>>,

    /// True count
    pub truth: Option<f64>,

    /// Absolute error per variant, in variant order
    pub errors: Vec<Option<f64>>,
}

/// Outer join of all variants and ground truth
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideComparison {
    variants: Vec<String>,
    rows: Vec<WideRow>,
    mean_errors: Vec<Option<f64>>,
}

impl WideComparison {
    /// Join `variants` and `truth` on filename
    ///
    /// The union of all filenames is kept, sorted. A mean error only counts
    /// rows where both the prediction and the truth exist.
    pub fn build(variants: &[VariantPredictions], truth: &GroundTruth) -> Self {
        let mut filenames: BTreeSet<&str> = truth.records().iter().map(|r| r.filename.as_str()).collect();
        for variant in variants {
            filenames.extend(variant.values.keys().map(String::as_str));
        }

        let rows: Vec<WideRow> = filenames
            .into_iter()
            .map(|filename| {
                let truth_value = truth.get(filename);
                let predictions: Vec<Option<f64>> = variants
                    .iter()
                    .map(|v| v.values.get(filename).copied().flatten())
                    .collect();
                let errors = predictions
                    .iter()
                    .map(|p| Some((p.as_ref()? - truth_value?).abs()))
                    .collect();
                WideRow {
                    filename: filename.to_string(),
                    predictions,
                    truth: truth_value,
                    errors,
                }
            })
            .collect();

        let mean_errors = (0..variants.len())
            .map(|i| {
                let errs: Vec<f64> = rows.iter().filter_map(|r| r.errors[i]).collect();
                if errs.is_empty() {
                    None
                } else {
                    Some(errs.iter().sum::<f64>() / errs.len() as f64)
                }
            })
            .collect();

        Self {
            variants: variants.iter().map(|v| v.name.clone()).collect(),
            rows,
            mean_errors,
        }
    }

    /// Variant names, in column order
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Joined rows, sorted by filename
    pub fn rows(&self) -> &[WideRow] {
        &self.rows
    }

    /// Mean absolute error of `variant`, if any row could be scored
    pub fn mean_error(&self, variant: &str) -> Option<f64> {
        let idx = self.variants.iter().position(|v| v == variant)?;
        self.mean_errors[idx]
    }

    /// Variant names paired with their mean absolute error
    pub fn mean_errors(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.variants
            .iter()
            .map(String::as_str)
            .zip(self.mean_errors.iter().copied())
    }

    /// The variant with the lowest mean absolute error (first one on ties)
    pub fn best(&self) -> Option<(&str, f64)> {
        self.mean_errors()
            .filter_map(|(name, err)| Some((name, err?)))
            .fold(None, |best, (name, err)| match best {
                Some((_, b)) if b <= err => best,
                _ => Some((name, err)),
            })
    }

    /// Render as `filename, <variants>, truth, error_<variant>...`
    pub fn to_table(&self) -> Table {
        let mut headers = vec![FILENAME_COLUMN.to_string()];
        headers.extend(self.variants.iter().cloned());
        headers.push(TRUTH_COLUMN.to_string());
        headers.extend(self.variants.iter().map(|v| format!("{}{}", ERROR_PREFIX, v)));

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.filename.clone()];
                cells.extend(row.predictions.iter().map(|p| format_number(*p)));
                cells.push(format_number(row.truth));
                cells.extend(row.errors.iter().map(|e| format_number(*e)));
                cells
            })
            .collect();
        Table::new(headers, rows)
    }

    /// Write the wide table as CSV
    pub fn write_csv(&self, path: &Path) -> Result<(), EvalError> {
        self.to_table().write_csv(path)
    }
}
