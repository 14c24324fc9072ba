//! Command implementations.

pub mod compare;
pub mod evaluate;
pub mod extract;
pub mod metrics;
pub mod run_all;
pub mod seed_truth;
pub mod variants;

pub use self::compare::execute_compare;
pub use self::evaluate::execute_evaluate;
pub use self::extract::execute_extract;
pub use self::metrics::execute_metrics;
pub use self::run_all::execute_run_all;
pub use self::seed_truth::execute_seed_truth;
pub use self::variants::execute_variants;

use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Dispatch a parsed command.
pub fn execute(command: Command, config: &Config, formatter: &Formatter) -> Result<()> {
    match command {
        Command::Extract(args) => execute_extract(args, config, formatter),
        Command::RunAll(args) => execute_run_all(args, config, formatter),
        Command::Evaluate(args) => execute_evaluate(args, config, formatter),
        Command::Metrics => execute_metrics(config, formatter),
        Command::Compare => execute_compare(config, formatter),
        Command::Variants => execute_variants(config, formatter),
        Command::SeedTruth(args) => execute_seed_truth(args, config, formatter),
    }
}
