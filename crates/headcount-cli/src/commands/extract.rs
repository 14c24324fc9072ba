//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use headcount_domain::LlmProvider;
use headcount_extractor::{Corpus, CsvResultSink, ExtractionPipeline, RunSummary, VariantConfig};
use headcount_llm::LlmError;
use std::path::Path;
use std::sync::Arc;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let variant = config.variant(&args.variant)?;
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
    let summary = run_variant(provider, variant, &corpus, &config.paths.predictions_dir)?;

    println!("{}", formatter.run_summaries(std::slice::from_ref(&summary)));
    println!(
        "{}",
        formatter.success(&format!(
            "Predictions written to {}",
            config.predictions_path(variant).display()
        ))
    );
    Ok(())
}

/// Run `variant` over `corpus`, writing its table into `predictions_dir`.
pub fn run_variant<L>(
    provider: Arc<L>,
    variant: &VariantConfig,
    corpus: &Corpus,
    predictions_dir: &Path,
) -> Result<RunSummary>
where
    L: LlmProvider<Error = LlmError>,
{
    let sink = CsvResultSink::new(
        predictions_dir.join(variant.output_file_name()),
        variant.write_policy,
        variant.record_status,
    );
    let mut pipeline = ExtractionPipeline::new(provider, sink, variant.clone());
    Ok(pipeline.run(corpus.documents())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headcount_domain::Document;
    use headcount_llm::MockProvider;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_variant_writes_prediction_table() {
        let dir = TempDir::new().unwrap();
        let corpus = Corpus::from_documents(vec![
            Document::new("b.txt", "Two of us."),
            Document::new("a.txt", "Alone today."),
        ]);
        let provider = Arc::new(MockProvider::new(r#"{"number_of_people": 2}"#));
        let variant = VariantConfig::new("mistral2", "mistral");

        let summary = run_variant(provider, &variant, &corpus, dir.path()).unwrap();
        assert_eq!(summary.documents, 2);

        let content = fs::read_to_string(dir.path().join("mistral2.csv")).unwrap();
        assert_eq!(content, "filename,number_of_people\na.txt,2\nb.txt,2\n");
    }
}
