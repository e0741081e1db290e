//! Command handlers. Each returns the process exit code.

use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info};

use super::commands::{BuildArgs, ConfigArgs, ValidateArgs};
use super::output::{LayerAudit, OutputFormatter};
use crate::ancestry::{compute_ancestry, DetectorPolicy};
use crate::config::StrataConfig;
use crate::model::Layer;
use crate::scan::audit_layer;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Deserialize)]
#[serde(untagged)]
enum LayersDocument {
    Wrapped { layers: Vec<Layer> },
    Bare(Vec<Layer>),
}

/// Reads layer scan results from `path` (`-` for stdin).
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML. Both the
/// `{ "layers": [...] }` form and a bare list are accepted.
pub fn load_layers(path: &Path) -> Result<Vec<Layer>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read layers from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read layers from {}", path.display()))?
    };

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let document: LayersDocument = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {} as YAML", path.display()))?
    };

    Ok(match document {
        LayersDocument::Wrapped { layers } => layers,
        LayersDocument::Bare(layers) => layers,
    })
}

/// Hex SHA-256 of the newline-joined layer hashes.
pub fn default_ancestry_name(layers: &[Layer]) -> String {
    let mut hasher = Sha256::new();
    for (i, layer) in layers.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(layer.hash.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn write_output(output: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}

/// Logs every malformed entry in `layers`; returns `true` if there was any.
fn report_invalid_layers(layers: &[Layer]) -> bool {
    let mut invalid = false;
    for (index, layer) in layers.iter().enumerate() {
        for problem in audit_layer(layer) {
            error!(index, layer = %layer.hash, "{}", problem);
            invalid = true;
        }
    }
    invalid
}

pub fn handle_build(args: &BuildArgs, config: &StrataConfig) -> i32 {
    let layers = match load_layers(&args.input) {
        Ok(layers) => layers,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };
    debug!("Loaded {} layers from {}", layers.len(), args.input.display());

    if report_invalid_layers(&layers) {
        return EXIT_INVALID_INPUT;
    }

    let policy = if args.strict {
        DetectorPolicy::Strict
    } else {
        config.detector_policy
    };
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| default_ancestry_name(&layers));

    info!(ancestry = %name, layers = layers.len(), %policy, "Building ancestry");
    let ancestry = match compute_ancestry(name, &layers, policy) {
        Ok(ancestry) => ancestry,
        Err(e) => {
            error!("{}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let format = args.format.map(Into::into).unwrap_or(config.output_format);
    let output = match OutputFormatter::new(format).format(&ancestry) {
        Ok(output) => output,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    if let Err(e) = write_output(&output, args.output.as_deref()) {
        error!("{:#}", e);
        return EXIT_FAILURE;
    }

    EXIT_SUCCESS
}

pub fn handle_validate(args: &ValidateArgs, config: &StrataConfig) -> i32 {
    let layers = match load_layers(&args.input) {
        Ok(layers) => layers,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let audits: Vec<LayerAudit> = layers
        .iter()
        .enumerate()
        .map(|(index, layer)| LayerAudit::new(index, &layer.hash, &audit_layer(layer)))
        .collect();
    let has_problems = audits.iter().any(|a| !a.problems.is_empty());

    match OutputFormatter::new(config.output_format).format_audit(&audits) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    }

    if has_problems {
        EXIT_INVALID_INPUT
    } else {
        EXIT_SUCCESS
    }
}

pub fn handle_config(args: &ConfigArgs, config: &StrataConfig) -> i32 {
    let format = args.format.map(Into::into).unwrap_or(config.output_format);
    match OutputFormatter::new(format).format_config(config) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LAYERS_JSON: &str = r#"{
        "layers": [
            {
                "hash": "sha256:base",
                "namespaces": [
                    {
                        "detector": { "name": "os-release", "version": "1.0", "kind": "namespace" },
                        "namespace": { "name": "centos", "version": "7", "version_format": "rpm" }
                    }
                ],
                "features": [
                    {
                        "detector": { "name": "rpm", "version": "1.0", "kind": "feature" },
                        "features": [
                            { "name": "openssl", "version": "1.0.2k", "version_format": "rpm", "kind": "binary" }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_load_layers_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layers.json");
        fs::write(&path, LAYERS_JSON).unwrap();

        let layers = load_layers(&path).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].hash, "sha256:base");
        assert_eq!(layers[0].detectors().len(), 2);
    }

    #[test]
    fn test_load_layers_yaml_bare_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layers.yaml");
        fs::write(
            &path,
            "- hash: sha256:a\n- hash: sha256:b\n  features:\n    - detector: { name: dpkg, version: '1.0', kind: feature }\n      status: not_found\n",
        )
        .unwrap();

        let layers = load_layers(&path).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].features.len(), 1);
    }

    #[test]
    fn test_load_layers_missing_file() {
        let err = load_layers(Path::new("/nonexistent/layers.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read layers"));
    }

    #[test]
    fn test_default_ancestry_name_is_stable() {
        let layers = vec![Layer::new("sha256:a"), Layer::new("sha256:b")];
        let name = default_ancestry_name(&layers);

        assert_eq!(name.len(), 64);
        assert_eq!(name, default_ancestry_name(&layers));
        assert_ne!(name, default_ancestry_name(&layers[..1]));
    }
}
