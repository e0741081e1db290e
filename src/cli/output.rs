//! Output formatting for JSON, YAML and human-readable text.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

pub use crate::config::OutputFormat;
use crate::config::StrataConfig;
use crate::model::Ancestry;
use crate::scan::LayerError;

/// Problems found in one input layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerAudit {
    pub index: usize,
    pub hash: String,
    pub problems: Vec<String>,
}

impl LayerAudit {
    pub fn new(index: usize, hash: &str, problems: &[LayerError]) -> Self {
        Self {
            index,
            hash: hash.to_string(),
            problems: problems.iter().map(ToString::to_string).collect(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, ancestry: &Ancestry) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(ancestry)
                .context("Failed to serialize ancestry to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(ancestry).context("Failed to serialize ancestry to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(ancestry)),
        }
    }

    pub fn format_audit(&self, audits: &[LayerAudit]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(audits)
                .context("Failed to serialize validation report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(audits)
                .context("Failed to serialize validation report to YAML"),
            OutputFormat::Human => Ok(self.format_audit_human(audits)),
        }
    }

    pub fn format_config(&self, config: &StrataConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize configuration to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize configuration to YAML"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_human(&self, ancestry: &Ancestry) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Ancestry: {}", ancestry.name);
        let _ = writeln!(out, "Detectors:");
        if ancestry.detectors.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for detector in &ancestry.detectors {
            let _ = writeln!(out, "  {}", detector);
        }

        let _ = writeln!(
            out,
            "Layers: {} ({} features)",
            ancestry.layers.len(),
            ancestry.feature_count()
        );
        for (index, layer) in ancestry.layers.iter().enumerate() {
            let _ = writeln!(
                out,
                "  [{}] {} - {} introduced",
                index,
                layer.hash,
                layer.features.len()
            );
            for f in &layer.features {
                let _ = writeln!(
                    out,
                    "      {} in {} (by {}, {})",
                    f.feature, f.namespace, f.feature_by.name, f.namespace_by.name
                );
            }
        }

        out
    }

    fn format_audit_human(&self, audits: &[LayerAudit]) -> String {
        let mut out = String::new();
        let problem_count: usize = audits.iter().map(|a| a.problems.len()).sum();

        if problem_count == 0 {
            let _ = writeln!(out, "✓ All layers are valid");
            return out;
        }

        let _ = writeln!(out, "✗ Found {} problem(s):", problem_count);
        for audit in audits.iter().filter(|a| !a.problems.is_empty()) {
            let _ = writeln!(out, "  [{}] {}", audit.index, audit.hash);
            for problem in &audit.problems {
                let _ = writeln!(out, "      - {}", problem);
            }
        }

        out
    }
}
