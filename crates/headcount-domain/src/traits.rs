//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction logic and
//! infrastructure. Implementations live in other crates.

use crate::ExtractionRecord;
use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded to the text-generation service
///
/// Every field is optional; unset fields are left to the model's defaults
/// and omitted from the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Restrict sampling to the k most likely tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Nucleus sampling probability mass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Penalty applied to repeated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
}

impl SamplingOptions {
    /// Check whether no option is set
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_k.is_none()
            && self.top_p.is_none()
            && self.repeat_penalty.is_none()
    }

    /// Validate the option ranges
    pub fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("temperature {} out of range [0.0, 2.0]", t));
            }
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("top_p {} out of range [0.0, 1.0]", p));
            }
        }
        if self.top_k == Some(0) {
            return Err("top_k must be greater than 0".to_string());
        }
        if let Some(r) = self.repeat_penalty {
            if r <= 0.0 {
                return Err(format!("repeat_penalty {} must be positive", r));
            }
        }
        Ok(())
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier (e.g., "mistral", "mixtral:8x7b")
    pub model: String,

    /// Full prompt text
    pub prompt: String,

    /// Sampling parameters for this variant
    pub sampling: SamplingOptions,
}

impl GenerationRequest {
    /// Create a request with default sampling
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            sampling: SamplingOptions::default(),
        }
    }

    /// Set the sampling parameters
    pub fn with_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (headcount-llm). The returned text
/// is untrusted: it may contain prose, markdown fences, several JSON-looking
/// fragments, or no JSON at all.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a text completion
    fn generate(&self, request: &GenerationRequest) -> Result<String, Self::Error>;
}

/// Trait for persisting extraction records
///
/// Implemented by the extractor crate's CSV sink. One sink per variant.
pub trait ResultSink {
    /// Error type for sink operations
    type Error;

    /// Persist one record
    fn append(&mut self, record: &ExtractionRecord) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sampling_is_empty_and_valid() {
        let sampling = SamplingOptions::default();
        assert!(sampling.is_empty());
        assert!(sampling.validate().is_ok());
    }

    #[test]
    fn test_sampling_out_of_range() {
        let sampling = SamplingOptions {
            top_p: Some(1.5),
            ..Default::default()
        };
        assert!(sampling.validate().is_err());

        let sampling = SamplingOptions {
            top_k: Some(0),
            ..Default::default()
        };
        assert!(sampling.validate().is_err());
    }

    #[test]
    fn test_unset_options_are_not_serialized() {
        let sampling = SamplingOptions {
            temperature: Some(0.2),
            ..Default::default()
        };
        let json = serde_json::to_string(&sampling).unwrap();
        assert_eq!(json, r#"{"temperature":0.2}"#);
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("phi4", "prompt").with_sampling(SamplingOptions {
            top_k: Some(20),
            ..Default::default()
        });
        assert_eq!(request.model, "phi4");
        assert_eq!(request.sampling.top_k, Some(20));
    }
}
