//! Metrics command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use headcount_eval::GlobalMetrics;

/// Execute the metrics command.
pub fn execute_metrics(config: &Config, formatter: &Formatter) -> Result<()> {
    let report = GlobalMetrics::new(&config.paths.results_dir).run()?;

    for skipped in &report.skipped {
        println!(
            "{}",
            formatter.warning(&format!("Skipped {}: {}", skipped.file, skipped.reason))
        );
    }
    println!("{}", formatter.metrics(&report));

    if let Some(best) = report.best() {
        report.write_csv(&config.paths.metrics_output)?;
        println!(
            "{}",
            formatter.success(&format!(
                "Best performer: {} (MAE {:.3}); metrics saved to {}",
                best.file,
                best.mae,
                config.paths.metrics_output.display()
            ))
        );
    }
    Ok(())
}
