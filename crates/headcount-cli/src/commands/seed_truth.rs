//! Seed-truth command implementation.

use crate::cli::SeedTruthArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use headcount_eval::Table;
use headcount_extractor::list_documents;
use std::path::Path;

/// Execute the seed-truth command.
pub fn execute_seed_truth(args: SeedTruthArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| config.paths.ground_truth.with_extension("csv"));
    let count = seed_truth(&config.paths.corpus_dir, &output)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Wrote {} filenames to {}",
            count,
            output.display()
        ))
    );
    println!(
        "{}",
        formatter.info("Fill in the truth column, then point [paths].ground_truth at the file")
    );
    Ok(())
}

/// Write a `filename,truth` template for every document in `corpus_dir`.
///
/// Refuses to overwrite an existing file.
pub fn seed_truth(corpus_dir: &Path, output: &Path) -> Result<usize> {
    if output.exists() {
        return Err(CliError::NotPermitted(format!(
            "{} already exists",
            output.display()
        )));
    }

    let rows: Vec<Vec<String>> = list_documents(corpus_dir)?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| vec![name.to_string_lossy().into_owned(), String::new()])
        .collect();
    let count = rows.len();

    Table::new(vec!["filename".to_string(), "truth".to_string()], rows).write_csv(output)?;
    Ok(count)
}
