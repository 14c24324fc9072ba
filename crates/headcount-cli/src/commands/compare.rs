//! Compare command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use headcount_eval::{load_variants, GroundTruth, WideComparison};

/// Execute the compare command.
pub fn execute_compare(config: &Config, formatter: &Formatter) -> Result<()> {
    let variants = load_variants(&config.paths.predictions_dir)?;
    let truth = GroundTruth::load(&config.paths.ground_truth)?;
    let comparison = WideComparison::build(&variants, &truth);

    println!("{}", formatter.comparison(&comparison));
    if variants.is_empty() {
        return Ok(());
    }

    comparison.write_csv(&config.paths.comparison_output)?;
    match comparison.best() {
        Some((name, err)) => println!(
            "{}",
            formatter.success(&format!("The most accurate variant is {} with MAE = {:.2}", name, err))
        ),
        None => println!(
            "{}",
            formatter.warning("No variant shares a labelled document with the ground truth")
        ),
    }
    println!(
        "{}",
        formatter.info(&format!(
            "Comparison saved to {}",
            config.paths.comparison_output.display()
        ))
    );
    Ok(())
}
