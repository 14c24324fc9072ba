//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use headcount_extractor::VariantConfig;
use headcount_llm::{OllamaProvider, ThrottlePolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "headcount.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Model service connection
    pub ollama: OllamaConfig,

    /// Request pacing and retries
    pub throttle: ThrottlePolicy,

    /// Extraction variants, run in this order by `run-all`
    pub variants: Vec<VariantConfig>,
}

/// Input and output locations, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of `.txt` outing narratives
    pub corpus_dir: PathBuf,

    /// Directory of per-variant prediction tables
    pub predictions_dir: PathBuf,

    /// Directory of per-variant evaluation tables
    pub results_dir: PathBuf,

    /// Ground-truth table (`.xlsx`, `.xls`, `.ods` or `.csv`)
    pub ground_truth: PathBuf,

    /// Aggregate metrics table
    pub metrics_output: PathBuf,

    /// Wide comparison table
    pub comparison_output: PathBuf,
}

/// Ollama connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in configuration.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("{} not found; using built-in configuration", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        if self.variants.is_empty() {
            return Err(CliError::Config("at least one variant is required".to_string()));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            variant.validate().map_err(CliError::Config)?;
            if !seen.insert(variant.name.as_str()) {
                return Err(CliError::Config(format!(
                    "duplicate variant name '{}'",
                    variant.name
                )));
            }
        }

        let mut outputs = HashSet::new();
        for variant in &self.variants {
            if !outputs.insert(variant.output_file_name()) {
                return Err(CliError::Config(format!(
                    "variant '{}' shares its output file with another variant",
                    variant.name
                )));
            }
        }

        if self.ollama.endpoint.trim().is_empty() {
            return Err(CliError::Config("ollama.endpoint must not be empty".to_string()));
        }
        if self.ollama.timeout_secs == 0 {
            return Err(CliError::Config("ollama.timeout_secs must be greater than 0".to_string()));
        }
        self.throttle.validate().map_err(CliError::Config)
    }

    /// Look up a variant by name.
    pub fn variant(&self, name: &str) -> Result<&VariantConfig> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| CliError::UnknownVariant {
                name: name.to_string(),
                available: self
                    .variants
                    .iter()
                    .map(|v| v.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Prediction table path for `variant`.
    pub fn predictions_path(&self, variant: &VariantConfig) -> PathBuf {
        self.paths.predictions_dir.join(variant.output_file_name())
    }

    /// Build the Ollama client described by this configuration.
    pub fn provider(&self) -> Result<OllamaProvider> {
        let provider = OllamaProvider::new(
            self.ollama.endpoint.clone(),
            Duration::from_secs(self.ollama.timeout_secs),
        )?;
        Ok(provider.with_throttle(self.throttle.clone()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            ollama: OllamaConfig::default(),
            throttle: ThrottlePolicy::default(),
            variants: VariantConfig::builtin(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            predictions_dir: PathBuf::from("predictions"),
            results_dir: PathBuf::from("results"),
            ground_truth: PathBuf::from("ground_truth/list_50.xlsx"),
            metrics_output: PathBuf::from("LLM_NBC_Evaluation.csv"),
            comparison_output: PathBuf::from("comparison_results.csv"),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: headcount_llm::ollama::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: headcount_llm::ollama::DEFAULT_TIMEOUT_SECS,
        }
    }
}
