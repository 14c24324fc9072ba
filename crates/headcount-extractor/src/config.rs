//! Variant configuration
//!
//! A variant is a (model, prompt, sampling) combination. Variants are plain
//! data: one pipeline runs any of them.

use headcount_domain::SamplingOptions;
use serde::{Deserialize, Serialize};

/// Rule-set language used to render the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptLanguage {
    /// Full English rule list with worked examples
    #[default]
    English,
    /// Full French rule list with worked examples
    French,
    /// Shorter English rule list for models with small context windows
    EnglishCompact,
}

/// How a sink treats a filename that already has a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Always add a new row; reruns duplicate filenames
    #[default]
    Append,
    /// Replace the existing row for the filename, append otherwise
    Upsert,
}

/// Configuration of one extraction variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Variant identifier; also the stem of its prediction file
    pub name: String,

    /// Model identifier passed to the provider
    pub model: String,

    /// Prompt rule-set language
    #[serde(default)]
    pub language: PromptLanguage,

    /// Truncate documents to this many characters before prompting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_chars: Option<usize>,

    /// Replace the built-in rule list for `language`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,

    /// Prediction file name inside the predictions directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Duplicate handling in the prediction file
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Add a `status` column marking fallback rows
    #[serde(default)]
    pub record_status: bool,

    /// Sampling parameters (kept last: it serializes as a TOML table)
    #[serde(default)]
    pub sampling: SamplingOptions,
}

impl VariantConfig {
    /// Create a variant with default prompt and sampling settings
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            sampling: SamplingOptions::default(),
            language: PromptLanguage::default(),
            max_input_chars: None,
            rules: None,
            output: None,
            write_policy: WritePolicy::default(),
            record_status: false,
        }
    }

    /// Set the prompt language
    pub fn with_language(mut self, language: PromptLanguage) -> Self {
        self.language = language;
        self
    }

    /// Set the sampling parameters
    pub fn with_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the truncation limit
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = Some(max_input_chars);
        self
    }

    /// Set the write policy
    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    /// File name of this variant's prediction table
    pub fn output_file_name(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.csv", self.name))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("variant name must not be empty".to_string());
        }
        if self.name.contains(['/', '\\']) {
            return Err(format!("variant name '{}' must not contain path separators", self.name));
        }
        if self.model.trim().is_empty() {
            return Err(format!("variant '{}': model must not be empty", self.name));
        }
        if self.max_input_chars == Some(0) {
            return Err(format!("variant '{}': max_input_chars must be greater than 0", self.name));
        }
        if let Some(rules) = &self.rules {
            if rules.iter().all(|r| r.trim().is_empty()) {
                return Err(format!("variant '{}': rules must not be empty", self.name));
            }
        }
        self.sampling
            .validate()
            .map_err(|e| format!("variant '{}': {}", self.name, e))
    }

    /// The four variants the project started with
    ///
    /// - `mistral_fr`: mistral, French rules, model defaults
    /// - `mixtral_fr`: mixtral 8x7b, French rules, conservative sampling
    /// - `phi4`: phi4, compact English rules, 1500-character input
    /// - `mistral2`: mistral, English rules, exploratory sampling
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("mistral_fr", "mistral").with_language(PromptLanguage::French),
            Self::new("mixtral_fr", "mixtral:8x7b")
                .with_language(PromptLanguage::French)
                .with_sampling(SamplingOptions {
                    temperature: Some(0.2),
                    top_k: Some(20),
                    top_p: Some(0.5),
                    repeat_penalty: Some(1.2),
                }),
            Self::new("phi4", "phi4")
                .with_language(PromptLanguage::EnglishCompact)
                .with_max_input_chars(1500),
            Self::new("mistral2", "mistral").with_sampling(SamplingOptions {
                temperature: Some(0.7),
                top_k: Some(50),
                top_p: Some(0.85),
                repeat_penalty: Some(1.1),
            }),
        ]
    }

    /// Load a variant from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize the variant to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
