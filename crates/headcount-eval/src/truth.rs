//! Hand-labelled ground truth

use crate::error::EvalError;
use crate::table::{parse_number, Table};
use headcount_domain::GroundTruthRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Canonical name of the key column
pub const FILENAME_COLUMN: &str = "filename";

/// Canonical name of the labelled count column
pub const TRUTH_COLUMN: &str = "truth";

/// Ground-truth table keyed by filename
///
/// Columns are taken by position: the first is the filename, the second the
/// true count, whatever their header says. Non-numeric counts become
/// missing. When a filename is labelled twice the first label is kept.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    records: Vec<GroundTruthRecord>,
    index: HashMap<String, usize>,
}

impl GroundTruth {
    /// Load ground truth from a CSV file or the first sheet of a workbook
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let table = Table::read(path)?;
        let truth = Self::from_table(&table, &path.display().to_string())?;
        info!(
            "Loaded {} ground-truth labels from {}",
            truth.len(),
            path.display()
        );
        Ok(truth)
    }

    /// Build from an already-read table; `label` names it in errors
    pub fn from_table(table: &Table, label: &str) -> Result<Self, EvalError> {
        if table.headers().len() < 2 {
            return Err(EvalError::MissingColumn {
                file: label.to_string(),
                column: TRUTH_COLUMN.to_string(),
            });
        }

        let records = table
            .column(0)
            .zip(table.column(1))
            .filter(|(filename, _)| !filename.trim().is_empty())
            .map(|(filename, truth)| GroundTruthRecord::new(filename.trim(), parse_number(truth)))
            .collect();

        Ok(Self::from_records(records))
    }

    /// Build from records, keeping the first label of any duplicate
    pub fn from_records(records: Vec<GroundTruthRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if index.contains_key(&record.filename) {
                warn!("Duplicate ground-truth label for {}; keeping the first", record.filename);
                continue;
            }
            index.insert(record.filename.clone(), kept.len());
            kept.push(record);
        }
        Self {
            records: kept,
            index,
        }
    }

    /// Truth for `filename`; `None` when unlabelled or unknown
    pub fn get(&self, filename: &str) -> Option<f64> {
        self.index
            .get(filename)
            .and_then(|&i| self.records[i].truth)
    }

    /// Records in file order
    pub fn records(&self) -> &[GroundTruthRecord] {
        &self.records
    }

    /// Number of distinct filenames
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv_positional_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("truth.csv");
        fs::write(&path, "Document,Truth\na.txt,2\nb.txt,unknown\nc.txt, 4 \n,9\n").unwrap();

        let truth = GroundTruth::load(&path).unwrap();
        assert_eq!(truth.len(), 3);
        assert_eq!(truth.get("a.txt"), Some(2.0));
        assert_eq!(truth.get("b.txt"), None);
        assert!(truth.records().iter().any(|r| r.filename == "b.txt"));
        assert_eq!(truth.get("c.txt"), Some(4.0));
        assert_eq!(truth.get("zzz.txt"), None);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let truth = GroundTruth::from_records(vec![
            GroundTruthRecord::new("a.txt", Some(1.0)),
            GroundTruthRecord::new("a.txt", Some(7.0)),
        ]);
        assert_eq!(truth.len(), 1);
        assert_eq!(truth.get("a.txt"), Some(1.0));
    }

    #[test]
    fn test_single_column_is_missing_truth() {
        let table = Table::new(vec!["filename".to_string()], vec![vec!["a.txt".to_string()]]);
        let err = GroundTruth::from_table(&table, "t.csv").unwrap_err();
        assert!(matches!(err, EvalError::MissingColumn { .. }));
    }
}
