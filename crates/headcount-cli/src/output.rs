//! Output formatting for the CLI.

use colored::*;
use headcount_eval::{EvaluationReport, MetricsReport, WideComparison};
use headcount_extractor::{PromptLanguage, RunSummary, VariantConfig};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format run summaries as a table.
    pub fn run_summaries(&self, summaries: &[RunSummary]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Variant", "Documents", "Extracted", "Fallback", "Failures", "Time (s)"]);

        for summary in summaries {
            let failures = if summary.failures.is_empty() {
                "-".to_string()
            } else {
                summary
                    .failures
                    .iter()
                    .map(|(kind, count)| format!("{} {}", count, kind))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            builder.push_record([
                summary.variant.clone(),
                summary.documents.to_string(),
                summary.extracted.to_string(),
                summary.fallback_count().to_string(),
                failures,
                format!("{:.1}", summary.elapsed_ms as f64 / 1000.0),
            ]);
        }

        styled(builder.build())
    }

    /// Format evaluation reports as a table.
    pub fn evaluation_reports(&self, reports: &[EvaluationReport]) -> String {
        if reports.is_empty() {
            return self.warning("No prediction files evaluated.");
        }

        let mut builder = Builder::default();
        builder.push_record(["Variant", "Rows", "N/A", "Output"]);
        for report in reports {
            builder.push_record([
                report.variant.clone(),
                report.rows.to_string(),
                report.not_applicable.to_string(),
                report.output.display().to_string(),
            ]);
        }

        styled(builder.build())
    }

    /// Format aggregate metrics as a table, best performer marked.
    pub fn metrics(&self, report: &MetricsReport) -> String {
        if report.is_empty() {
            return self.warning("No valid files processed.");
        }

        let best = report.best().map(|m| m.file.as_str());
        let mut builder = Builder::default();
        builder.push_record(["", "File", "MAE", "MSE", "RMSE", "R2", "Bias"]);
        for m in &report.metrics {
            let marker = if Some(m.file.as_str()) == best { "*" } else { "" };
            builder.push_record([
                marker.to_string(),
                m.file.clone(),
                format!("{:.3}", m.mae),
                format!("{:.3}", m.mse),
                format!("{:.3}", m.rmse),
                format!("{:.3}", m.r2),
                format!("{:+.3}", m.bias),
            ]);
        }

        styled(builder.build())
    }

    /// Format per-variant mean absolute errors of a wide comparison.
    pub fn comparison(&self, comparison: &WideComparison) -> String {
        if comparison.variants().is_empty() {
            return self.warning("No prediction files found.");
        }

        let best = comparison.best().map(|(name, _)| name);
        let mut builder = Builder::default();
        builder.push_record(["", "Variant", "Mean abs. error"]);
        for (name, err) in comparison.mean_errors() {
            let marker = if Some(name) == best { "*" } else { "" };
            builder.push_record([
                marker.to_string(),
                name.to_string(),
                err.map(|e| format!("{:.2}", e)).unwrap_or_else(|| "-".to_string()),
            ]);
        }

        styled(builder.build())
    }

    /// Format configured variants as a table.
    pub fn variants(&self, variants: &[VariantConfig]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Name", "Model", "Prompt", "Max chars", "Sampling", "Output", "Policy"]);

        for v in variants {
            let language = match v.language {
                PromptLanguage::English => "english",
                PromptLanguage::French => "french",
                PromptLanguage::EnglishCompact => "english_compact",
            };
            let prompt = if v.rules.is_some() {
                format!("{} (custom rules)", language)
            } else {
                language.to_string()
            };
            builder.push_record([
                v.name.clone(),
                v.model.clone(),
                prompt,
                v.max_input_chars
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format_sampling(v),
                v.output_file_name(),
                format!("{:?}", v.write_policy).to_lowercase(),
            ]);
        }

        styled(builder.build())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn format_sampling(v: &VariantConfig) -> String {
    let s = &v.sampling;
    let mut parts = Vec::new();
    if let Some(t) = s.temperature {
        parts.push(format!("temp={}", t));
    }
    if let Some(k) = s.top_k {
        parts.push(format!("top_k={}", k));
    }
    if let Some(p) = s.top_p {
        parts.push(format!("top_p={}", p));
    }
    if let Some(r) = s.repeat_penalty {
        parts.push(format!("repeat={}", r));
    }
    if parts.is_empty() {
        "model defaults".to_string()
    } else {
        parts.join(" ")
    }
}
