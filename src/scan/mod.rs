//! Turning a layer's files into a [`Layer`] scan result.

pub mod layer_builder;

pub use layer_builder::{audit_layer, LayerBuilder, LayerError};

use crate::detectors::{DetectorRegistry, FilesMap, RegistryError};
use crate::model::{Detector, Layer};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// Runs the detectors in `to_use` over the files of one layer.
///
/// Detectors that ran but found nothing still appear in the result with their status,
/// so the ancestry builder sees an explicit empty report.
pub fn scan_layer(
    registry: &DetectorRegistry,
    hash: &str,
    files: &FilesMap,
    to_use: &[Detector],
) -> Result<Layer, ScanError> {
    let namespaces = registry.detect_namespaces(files, to_use)?;
    let features = registry.detect_features(files, to_use)?;

    let mut builder = LayerBuilder::new(hash);
    for (detector, result) in namespaces {
        builder.declare(&detector, result.status)?;
        if let Some(namespace) = result.namespace {
            builder.add_namespace(&detector, namespace)?;
        }
    }

    for (detector, result) in features {
        builder.declare(&detector, result.status)?;
        for feature in result.features {
            builder.add_feature(&detector, feature)?;
        }
    }

    let layer = builder.build();
    debug!(
        layer = %layer.hash,
        files = files.len(),
        namespaces = layer.all_unique_namespaces().len(),
        features = layer.all_unique_features().len(),
        "Scanned layer"
    );
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::{MockFeatureDetector, MockNamespaceDetector};
    use crate::model::{
        DetectorStatus, Feature, FeatureDetectResult, Namespace, NamespaceDetectResult,
    };
    use std::sync::Arc;

    #[test]
    fn test_scan_layer_runs_requested_detectors() {
        let mut ns = MockNamespaceDetector::new();
        ns.expect_detect().times(1).returning(|files| {
            assert!(files.contains_key("etc/os-release"));
            Ok(NamespaceDetectResult::found(Namespace::new("debian", "10", "dpkg")))
        });

        let mut dpkg = MockFeatureDetector::new();
        dpkg.expect_detect().times(1).returning(|_| {
            Ok(FeatureDetectResult::found(vec![
                Feature::binary("bash", "5.0", "dpkg"),
                Feature::binary("bash", "5.0", "dpkg"),
            ]))
        });

        let mut registry = DetectorRegistry::new();
        let nsd = registry
            .register_namespace_detector("os-release", "1.0", Arc::new(ns))
            .unwrap();
        let fd = registry
            .register_feature_detector("dpkg", "1.0", Arc::new(dpkg))
            .unwrap();

        let mut files = FilesMap::new();
        files.insert("etc/os-release".to_string(), b"ID=debian".to_vec());

        let layer = scan_layer(&registry, "sha256:abc", &files, &[nsd.clone(), fd.clone()]).unwrap();

        assert_eq!(layer.hash, "sha256:abc");
        assert_eq!(layer.detectors(), vec![fd.clone(), nsd]);
        assert_eq!(layer.features[&fd].features.len(), 1);
    }

    #[test]
    fn test_scan_layer_keeps_not_found_status() {
        let mut dpkg = MockFeatureDetector::new();
        dpkg.expect_detect()
            .returning(|_| Ok(FeatureDetectResult::with_status(DetectorStatus::NotFound)));

        let mut registry = DetectorRegistry::new();
        let fd = registry
            .register_feature_detector("dpkg", "1.0", Arc::new(dpkg))
            .unwrap();

        let layer = scan_layer(&registry, "sha256:abc", &FilesMap::new(), &[fd.clone()]).unwrap();
        assert_eq!(layer.features[&fd].status, DetectorStatus::NotFound);
    }

    #[test]
    fn test_scan_layer_rejects_invalid_namespace() {
        let mut ns = MockNamespaceDetector::new();
        ns.expect_detect()
            .returning(|_| Ok(NamespaceDetectResult::found(Namespace::new("debian", "", "dpkg"))));

        let mut registry = DetectorRegistry::new();
        let nsd = registry
            .register_namespace_detector("os-release", "1.0", Arc::new(ns))
            .unwrap();

        let err = scan_layer(&registry, "sha256:abc", &FilesMap::new(), &[nsd]).unwrap_err();
        assert!(matches!(err, ScanError::Layer(LayerError::InvalidNamespace { .. })));
    }
}
