//! Run-all command implementation.

use crate::cli::RunAllArgs;
use crate::commands::extract::run_variant;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use headcount_domain::LlmProvider;
use headcount_extractor::{Corpus, RunSummary, VariantConfig};
use headcount_llm::LlmError;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the run-all command.
pub fn execute_run_all(args: RunAllArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let corpus_dir = args.corpus.as_deref().unwrap_or(&config.paths.corpus_dir);
    let corpus = Corpus::load(corpus_dir)?;
    if corpus.is_empty() {
        println!(
            "{}",
            formatter.warning(&format!("No documents in {}", corpus_dir.display()))
        );
        return Ok(());
    }

    let provider = Arc::new(config.provider()?);
    let cooldown = provider.clone();
    let summaries = run_variants(
        provider,
        &config.variants,
        &corpus,
        &config.paths.predictions_dir,
        || cooldown.cool_down(),
    )?;

    println!("{}", formatter.run_summaries(&summaries));
    println!(
        "{}",
        formatter.success(&format!("{} variant(s) completed", summaries.len()))
    );
    Ok(())
}

/// Run each variant in order, calling `between` before every run but the first.
pub fn run_variants<L, F>(
    provider: Arc<L>,
    variants: &[VariantConfig],
    corpus: &Corpus,
    predictions_dir: &Path,
    mut between: F,
) -> Result<Vec<RunSummary>>
where
    L: LlmProvider<Error = LlmError>,
    F: FnMut(),
{
    let mut summaries = Vec::with_capacity(variants.len());
    for (i, variant) in variants.iter().enumerate() {
        if i > 0 {
            between();
        }
        info!("Running variant {}/{}: {}", i + 1, variants.len(), variant.name);
        summaries.push(run_variant(provider.clone(), variant, corpus, predictions_dir)?);
    }
    Ok(summaries)
}
