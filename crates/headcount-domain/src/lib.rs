//! Headcount Domain Layer
//!
//! Core data model and boundary traits for the headcount extraction and
//! evaluation system.
//!
//! ## Key Concepts
//!
//! - **Document**: one outing narrative, keyed by its filename
//! - **ExtractionRecord**: the people count a model variant produced for a document
//! - **GroundTruthRecord**: the hand-labelled count for a document
//! - **EvaluationRow**: a prediction joined to its ground truth, with accuracy
//! - **ModelMetrics**: aggregate regression error statistics for one variant
//!
//! ## Architecture
//!
//! Infrastructure (HTTP clients, CSV files, workbooks) lives in other crates.
//! This crate only defines the values that flow between them and the traits
//! at the seams (`LlmProvider`, `ResultSink`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod evaluation;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use document::Document;
pub use evaluation::{Accuracy, EvaluationRow, ModelMetrics};
pub use record::{ExtractionRecord, ExtractionStatus, GroundTruthRecord};
pub use traits::{GenerationRequest, LlmProvider, ResultSink, SamplingOptions};
