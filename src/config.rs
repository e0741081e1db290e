//! Configuration management for strata
//!
//! Settings are loaded from environment variables with defaults. Command-line flags
//! override whatever is loaded here.
//!
//! # Environment Variables
//!
//! - `STRATA_DETECTOR_POLICY`: How to treat layers whose detector set differs from the
//!   base layer (lenient|strict) - default: "lenient"
//! - `STRATA_OUTPUT_FORMAT`: Output format (json|yaml|human) - default: "human"
//! - `STRATA_LOG_LEVEL`: Logging level - default: "info"
//! - `STRATA_LOG_JSON`: Emit logs as JSON (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use strata::StrataConfig;
//!
//! let config = StrataConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::ancestry::DetectorPolicy;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Human;

/// Format used to print results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "human" | "text" => Some(OutputFormat::Human),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Human => write!(f, "human"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrataConfig {
    /// Handling of layers with a detector set different from the base layer
    pub detector_policy: DetectorPolicy,

    /// Format used to print results
    pub output_format: OutputFormat,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl Default for StrataConfig {
    /// Loads from `STRATA_*` environment variables, falling back to defaults for
    /// missing or unparseable values.
    fn default() -> Self {
        let detector_policy = env::var("STRATA_DETECTOR_POLICY")
            .ok()
            .and_then(|v| DetectorPolicy::from_name(&v))
            .unwrap_or_default();

        let output_format = env::var("STRATA_OUTPUT_FORMAT")
            .ok()
            .and_then(|v| OutputFormat::from_name(&v))
            .unwrap_or(DEFAULT_OUTPUT_FORMAT);

        let log_level = env::var("STRATA_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("STRATA_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            detector_policy,
            output_format,
            log_level,
            log_json,
        }
    }
}

impl StrataConfig {
    /// Loads from the environment like [`Default`], but rejects values that do not
    /// parse instead of ignoring them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default();

        if let Ok(v) = env::var("STRATA_DETECTOR_POLICY") {
            if DetectorPolicy::from_name(&v).is_none() {
                return Err(ConfigError::ParseError {
                    field: "STRATA_DETECTOR_POLICY".to_string(),
                    error: format!("'{}' is not one of: lenient, strict", v),
                });
            }
        }

        if let Ok(v) = env::var("STRATA_OUTPUT_FORMAT") {
            if OutputFormat::from_name(&v).is_none() {
                return Err(ConfigError::ParseError {
                    field: "STRATA_OUTPUT_FORMAT".to_string(),
                    error: format!("'{}' is not one of: json, yaml, human", v),
                });
            }
        }

        if let Ok(v) = env::var("STRATA_LOG_JSON") {
            if let Err(e) = v.parse::<bool>() {
                return Err(ConfigError::ParseError {
                    field: "STRATA_LOG_JSON".to_string(),
                    error: e.to_string(),
                });
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert(
            "detector_policy".to_string(),
            self.detector_policy.to_string(),
        );
        map.insert("output_format".to_string(), self.output_format.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());

        map
    }
}

impl fmt::Display for StrataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strata Configuration:")?;
        writeln!(f, "  Detector Policy: {}", self.detector_policy)?;
        writeln!(f, "  Output Format: {}", self.output_format)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        Ok(())
    }
}
