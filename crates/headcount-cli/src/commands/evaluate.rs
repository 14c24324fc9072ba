//! Evaluate command implementation.

use crate::cli::EvaluateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use headcount_eval::{Evaluator, GroundTruth};
use std::path::PathBuf;

/// Execute the evaluate command.
pub fn execute_evaluate(args: EvaluateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let truth = GroundTruth::load(&config.paths.ground_truth)?;
    let evaluator = Evaluator::new(truth);

    let reports = match args.variant {
        Some(name) => {
            let predictions = prediction_file(config, &name);
            vec![evaluator.evaluate_file(&predictions, &config.paths.results_dir)?]
        }
        None => evaluator.evaluate_dir(&config.paths.predictions_dir, &config.paths.results_dir)?,
    };

    println!("{}", formatter.evaluation_reports(&reports));
    Ok(())
}

/// Prediction table for `name`: a configured variant's output, else `<name>.csv`.
fn prediction_file(config: &Config, name: &str) -> PathBuf {
    match config.variant(name) {
        Ok(variant) => config.predictions_path(variant),
        Err(_) => config.paths.predictions_dir.join(format!("{}.csv", name)),
    }
}
