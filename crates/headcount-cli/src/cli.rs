//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Count the people on each outing with local LLMs, then score the counts.
#[derive(Debug, Parser)]
#[command(name = "headcount")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: headcount.toml, built-in settings if absent)
    #[arg(short, long, global = true, env = "HEADCOUNT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one variant over the corpus
    Extract(ExtractArgs),

    /// Run every configured variant, one after another
    RunAll(RunAllArgs),

    /// Join predictions with ground truth and compute per-row accuracy
    Evaluate(EvaluateArgs),

    /// Compute MAE / MSE / RMSE / R² / bias over every evaluation table
    Metrics,

    /// Put every variant's raw predictions side by side
    Compare,

    /// List configured variants
    Variants,

    /// Write a ground-truth template listing every corpus document
    SeedTruth(SeedTruthArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Variant name
    pub variant: String,

    /// Corpus directory (overrides [paths].corpus_dir)
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

/// Arguments for the run-all command.
#[derive(Debug, Args)]
pub struct RunAllArgs {
    /// Corpus directory (overrides [paths].corpus_dir)
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

/// Arguments for the evaluate command.
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Variant to evaluate; every prediction file when omitted
    pub variant: Option<String>,
}

/// Arguments for the seed-truth command.
#[derive(Debug, Args)]
pub struct SeedTruthArgs {
    /// Template path (default: [paths].ground_truth with a .csv extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
