//! Variants command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the variants command.
pub fn execute_variants(config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.variants(&config.variants));
    Ok(())
}
