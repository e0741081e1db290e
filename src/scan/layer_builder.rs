//! Assembles one layer's scan result from detector outputs.

use crate::model::{
    Detector, DetectorKind, DetectorStatus, Feature, FeatureDetectResult, Layer, Namespace,
    NamespaceDetectResult,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("Layer hash must not be empty")]
    EmptyHash,

    #[error("Existing layer has hash {found}, expected {expected}")]
    HashMismatch { expected: String, found: String },

    #[error("Detector {0} must have a non-empty name and version")]
    InvalidDetector(Detector),

    #[error("{detector} cannot report this result, expected a {expected} detector")]
    WrongDetectorKind {
        detector: Detector,
        expected: DetectorKind,
    },

    #[error("{detector} already reported namespace {existing}, cannot also report {namespace}")]
    DuplicateNamespace {
        detector: Detector,
        existing: Namespace,
        namespace: Namespace,
    },

    #[error("{detector} reported invalid namespace {namespace:?}")]
    InvalidNamespace {
        detector: Detector,
        namespace: Namespace,
    },
}

/// Accumulates detector results for a single layer.
///
/// Every result is checked against its detector's kind, features are de-duplicated per
/// detector, and a namespace detector may report at most one namespace.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    layer: Layer,
}

impl LayerBuilder {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            layer: Layer::new(hash),
        }
    }

    /// Starts from a previously stored scan result of the same layer.
    pub fn from_existing(hash: &str, existing: &Layer) -> Result<Self, LayerError> {
        if existing.hash != hash {
            return Err(LayerError::HashMismatch {
                expected: hash.to_string(),
                found: existing.hash.clone(),
            });
        }

        Ok(Self {
            layer: existing.clone(),
        })
    }

    /// Records that `detector` ran on this layer with `status`, even if it found
    /// nothing.
    pub fn declare(
        &mut self,
        detector: &Detector,
        status: DetectorStatus,
    ) -> Result<&mut Self, LayerError> {
        Self::check_valid(detector)?;
        match detector.kind {
            DetectorKind::Feature => {
                self.layer
                    .features
                    .entry(detector.clone())
                    .or_default()
                    .status = status;
            }
            DetectorKind::Namespace => {
                self.layer
                    .namespaces
                    .entry(detector.clone())
                    .or_default()
                    .status = status;
            }
        }
        Ok(self)
    }

    pub fn add_feature(
        &mut self,
        detector: &Detector,
        feature: Feature,
    ) -> Result<&mut Self, LayerError> {
        Self::check_kind(detector, DetectorKind::Feature)?;

        let result = self
            .layer
            .features
            .entry(detector.clone())
            .or_insert_with(|| FeatureDetectResult::found(Vec::new()));
        if !result.features.contains(&feature) {
            result.features.push(feature);
        }
        Ok(self)
    }

    pub fn add_namespace(
        &mut self,
        detector: &Detector,
        namespace: Namespace,
    ) -> Result<&mut Self, LayerError> {
        Self::check_kind(detector, DetectorKind::Namespace)?;
        if !namespace.is_valid() {
            return Err(LayerError::InvalidNamespace {
                detector: detector.clone(),
                namespace,
            });
        }

        let result = self
            .layer
            .namespaces
            .entry(detector.clone())
            .or_insert_with(|| NamespaceDetectResult::with_status(DetectorStatus::Found));
        if let Some(existing) = &result.namespace {
            if *existing != namespace {
                return Err(LayerError::DuplicateNamespace {
                    detector: detector.clone(),
                    existing: existing.clone(),
                    namespace,
                });
            }
        }

        result.namespace = Some(namespace);
        Ok(self)
    }

    pub fn build(self) -> Layer {
        self.layer
    }

    fn check_valid(detector: &Detector) -> Result<(), LayerError> {
        if detector.is_valid() {
            Ok(())
        } else {
            Err(LayerError::InvalidDetector(detector.clone()))
        }
    }

    fn check_kind(detector: &Detector, expected: DetectorKind) -> Result<(), LayerError> {
        Self::check_valid(detector)?;
        if detector.kind != expected {
            return Err(LayerError::WrongDetectorKind {
                detector: detector.clone(),
                expected,
            });
        }
        Ok(())
    }
}

/// Checks `layer` against the rules [`LayerBuilder`] enforces and returns every
/// violation found.
pub fn audit_layer(layer: &Layer) -> Vec<LayerError> {
    let mut problems = Vec::new();
    if layer.hash.is_empty() {
        problems.push(LayerError::EmptyHash);
    }

    for (detector, result) in &layer.namespaces {
        if let Err(e) = LayerBuilder::check_kind(detector, DetectorKind::Namespace) {
            problems.push(e);
            continue;
        }
        if let Some(namespace) = &result.namespace {
            if !namespace.is_valid() {
                problems.push(LayerError::InvalidNamespace {
                    detector: detector.clone(),
                    namespace: namespace.clone(),
                });
            }
        }
    }

    for detector in layer.features.keys() {
        if let Err(e) = LayerBuilder::check_kind(detector, DetectorKind::Feature) {
            problems.push(e);
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nsd() -> Detector {
        Detector::namespace("os-release", "1.0")
    }

    fn fd() -> Detector {
        Detector::feature("dpkg", "1.0")
    }

    #[test]
    fn test_build_collects_results() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder
            .add_namespace(&nsd(), Namespace::new("debian", "10", "dpkg"))
            .unwrap()
            .add_feature(&fd(), Feature::binary("bash", "5.0", "dpkg"))
            .unwrap()
            .add_feature(&fd(), Feature::binary("bash", "5.0", "dpkg"))
            .unwrap();

        let layer = builder.build();
        assert_eq!(layer.hash, "sha256:abc");
        assert_eq!(layer.features[&fd()].features.len(), 1);
        assert_eq!(layer.features[&fd()].status, DetectorStatus::Found);
        assert_eq!(
            layer.namespaces[&nsd()].namespace,
            Some(Namespace::new("debian", "10", "dpkg"))
        );
    }

    #[test]
    fn test_wrong_detector_kind() {
        let mut builder = LayerBuilder::new("sha256:abc");

        let err = builder
            .add_feature(&nsd(), Feature::binary("bash", "5.0", "dpkg"))
            .unwrap_err();
        assert_eq!(
            err,
            LayerError::WrongDetectorKind {
                detector: nsd(),
                expected: DetectorKind::Feature,
            }
        );

        let err = builder
            .add_namespace(&fd(), Namespace::new("debian", "10", "dpkg"))
            .unwrap_err();
        assert!(matches!(err, LayerError::WrongDetectorKind { .. }));
    }

    #[test]
    fn test_one_namespace_per_detector() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder
            .add_namespace(&nsd(), Namespace::new("debian", "10", "dpkg"))
            .unwrap();
        builder
            .add_namespace(&nsd(), Namespace::new("debian", "10", "dpkg"))
            .unwrap();

        let err = builder
            .add_namespace(&nsd(), Namespace::new("debian", "11", "dpkg"))
            .unwrap_err();
        assert!(matches!(err, LayerError::DuplicateNamespace { .. }));
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let mut builder = LayerBuilder::new("sha256:abc");
        let err = builder
            .add_namespace(&nsd(), Namespace::new("debian", "", "dpkg"))
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidNamespace { .. }));
    }

    #[test]
    fn test_declare_records_empty_result() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder.declare(&fd(), DetectorStatus::NotFound).unwrap();
        builder.declare(&nsd(), DetectorStatus::Corrupted).unwrap();

        let layer = builder.build();
        assert_eq!(layer.features[&fd()].status, DetectorStatus::NotFound);
        assert!(layer.features[&fd()].features.is_empty());
        assert_eq!(layer.namespaces[&nsd()].status, DetectorStatus::Corrupted);
        assert!(layer.namespaces[&nsd()].namespace.is_none());
    }

    #[test]
    fn test_declare_then_namespace_fills_in() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder.declare(&nsd(), DetectorStatus::Found).unwrap();
        builder
            .add_namespace(&nsd(), Namespace::new("alpine", "3.18", "apk"))
            .unwrap();

        assert!(builder.build().namespaces[&nsd()].namespace.is_some());
    }

    #[test]
    fn test_from_existing() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder
            .add_feature(&fd(), Feature::binary("bash", "5.0", "dpkg"))
            .unwrap();
        let existing = builder.build();

        let mut builder = LayerBuilder::from_existing("sha256:abc", &existing).unwrap();
        builder
            .add_feature(&fd(), Feature::binary("zsh", "5.8", "dpkg"))
            .unwrap();
        assert_eq!(builder.build().features[&fd()].features.len(), 2);

        let err = LayerBuilder::from_existing("sha256:def", &existing).unwrap_err();
        assert!(matches!(err, LayerError::HashMismatch { .. }));
    }

    #[test]
    fn test_invalid_detector() {
        let mut builder = LayerBuilder::new("sha256:abc");
        let err = builder
            .declare(&Detector::feature("dpkg", ""), DetectorStatus::Found)
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidDetector(_)));
    }

    #[test]
    fn test_audit_layer() {
        let mut layer = Layer::new("");
        layer.namespaces.insert(
            fd(),
            NamespaceDetectResult::found(Namespace::new("debian", "10", "dpkg")),
        );
        layer.namespaces.insert(
            nsd(),
            NamespaceDetectResult::found(Namespace::new("debian", "", "dpkg")),
        );
        layer
            .features
            .insert(fd(), FeatureDetectResult::found(vec![]));

        let problems = audit_layer(&layer);
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0], LayerError::EmptyHash);
    }

    #[test]
    fn test_audit_clean_layer() {
        let mut builder = LayerBuilder::new("sha256:abc");
        builder
            .add_namespace(&nsd(), Namespace::new("debian", "10", "dpkg"))
            .unwrap();
        assert!(audit_layer(&builder.build()).is_empty());
    }
}
