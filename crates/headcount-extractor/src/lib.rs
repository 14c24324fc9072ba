//! Headcount Extractor
//!
//! Turns free-text outing narratives into people counts, one variant at a
//! time.
//!
//! # Architecture
//!
//! ```text
//! Corpus → PromptBuilder → LlmProvider → parse_response → ResultSink
//! ```
//!
//! Every document yields exactly one record. When the model cannot be
//! reached or its answer cannot be recovered, a sentinel record with a count
//! of zero is written instead, so prediction tables always cover the corpus.
//!
//! # Example Usage
//!
//! ```
//! use headcount_extractor::{ExtractionPipeline, MemorySink, VariantConfig};
//! use headcount_domain::Document;
//! use headcount_llm::MockProvider;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(MockProvider::new(r#"{"filename": "a.txt", "number_of_people": 4}"#));
//! let variant = VariantConfig::new("mistral2", "mistral");
//! let mut pipeline = ExtractionPipeline::new(provider, MemorySink::new(), variant);
//!
//! let summary = pipeline.run(&[Document::new("a.txt", "Four of us reached the pass.")]).unwrap();
//! assert_eq!(summary.extracted, 1);
//! assert_eq!(pipeline.into_sink().records[0].number_of_people, 4);
//! ```

#![warn(missing_docs)]

mod config;
mod corpus;
mod error;
pub mod parser;
mod pipeline;
pub mod prompt;
pub mod sink;
mod types;


pub use config::{PromptLanguage, VariantConfig, WritePolicy};
pub use corpus::{list_documents, Corpus, DOCUMENT_EXTENSION};
pub use error::{ExtractorError, ParseError};
pub use parser::parse_response;
pub use pipeline::ExtractionPipeline;
pub use prompt::PromptBuilder;
pub use sink::{CsvResultSink, MemorySink};
pub use types::{DocumentFailure, DocumentOutcome, FailureKind, RunSummary};
