//! Per-variant extraction pipeline

use crate::config::VariantConfig;
use crate::error::{ExtractorError, ParseError};
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::types::{DocumentFailure, DocumentOutcome, FailureKind, RunSummary};
use headcount_domain::{Document, ExtractionRecord, GenerationRequest, LlmProvider, ResultSink};
use headcount_llm::LlmError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs one variant over a corpus, persisting exactly one record per document
///
/// Recoverable failures (transport, empty answers, malformed or invalid JSON)
/// become sentinel records with a count of zero. Only sink failures stop the
/// run.
pub struct ExtractionPipeline<L, S>
where
    L: LlmProvider<Error = LlmError>,
    S: ResultSink,
{
    provider: Arc<L>,
    sink: S,
    variant: VariantConfig,
}

impl<L, S> ExtractionPipeline<L, S>
where
    L: LlmProvider<Error = LlmError>,
    S: ResultSink,
    S::Error: std::fmt::Display,
{
    /// Create a pipeline for `variant` writing to `sink`
    pub fn new(provider: Arc<L>, sink: S, variant: VariantConfig) -> Self {
        Self {
            provider,
            sink,
            variant,
        }
    }

    /// The variant this pipeline runs
    pub fn variant(&self) -> &VariantConfig {
        &self.variant
    }

    /// Consume the pipeline and return its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Build the prompt for `document` under this variant
    pub fn prompt_for(&self, document: &Document) -> String {
        PromptBuilder::new(&document.raw_text, &document.filename)
            .with_language(self.variant.language)
            .with_max_input_chars(self.variant.max_input_chars)
            .with_rules(self.variant.rules.as_deref())
            .build()
    }

    /// Extract and persist one document
    pub fn process_document(&mut self, document: &Document) -> Result<DocumentOutcome, ExtractorError> {
        info!(
            "[{}] Processing {} ({} chars)",
            self.variant.name,
            document.filename,
            document.char_len()
        );

        let outcome = match self.extract(document) {
            Ok(record) => DocumentOutcome {
                record,
                failure: None,
            },
            Err(failure) => {
                match failure.kind {
                    FailureKind::Transport => error!(
                        "[{}] Model call failed for {}: {}",
                        self.variant.name, document.filename, failure.message
                    ),
                    _ => warn!(
                        "[{}] Falling back to 0 for {}: {}",
                        self.variant.name, document.filename, failure.message
                    ),
                }
                DocumentOutcome {
                    record: ExtractionRecord::fallback(&document.filename),
                    failure: Some(failure),
                }
            }
        };

        self.sink
            .append(&outcome.record)
            .map_err(|e| ExtractorError::Sink(e.to_string()))?;

        Ok(outcome)
    }

    /// Process every document in order
    ///
    /// Stops at the first sink error; records already written stay written.
    pub fn run(&mut self, documents: &[Document]) -> Result<RunSummary, ExtractorError> {
        let start = Instant::now();
        let mut summary = RunSummary::new(&self.variant.name);

        info!(
            "[{}] Starting run over {} documents with model {}",
            self.variant.name,
            documents.len(),
            self.variant.model
        );

        for document in documents {
            let outcome = self.process_document(document)?;
            summary.record(&outcome);
        }

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        info!("Run complete: {}", summary);

        Ok(summary)
    }

    fn extract(&self, document: &Document) -> Result<ExtractionRecord, DocumentFailure> {
        let prompt = self.prompt_for(document);
        debug!("Prompt length: {} chars", prompt.len());

        let request = GenerationRequest::new(&self.variant.model, prompt)
            .with_sampling(self.variant.sampling);

        let response = self.provider.generate(&request).map_err(failure_from_llm)?;
        debug!("LLM response length: {} chars", response.len());

        if response.trim().is_empty() {
            return Err(DocumentFailure {
                kind: FailureKind::EmptyResponse,
                message: "Model returned an empty response".to_string(),
            });
        }

        parse_response(&response, &document.filename).map_err(failure_from_parse)
    }
}

fn failure_from_llm(e: LlmError) -> DocumentFailure {
    let kind = if e.is_transport() {
        FailureKind::Transport
    } else {
        FailureKind::EmptyResponse
    };
    DocumentFailure {
        kind,
        message: e.to_string(),
    }
}

fn failure_from_parse(e: ParseError) -> DocumentFailure {
    let kind = match e {
        ParseError::MalformedJson(_) => FailureKind::MalformedJson,
        ParseError::SchemaViolation(_) => FailureKind::SchemaViolation,
    };
    DocumentFailure {
        kind,
        message: e.to_string(),
    }
}
