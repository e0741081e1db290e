//! Builders for layer scan results shared by the integration tests.

#![allow(dead_code)]

use strata::model::{FeatureDetectResult, NamespaceDetectResult};
use strata::{Detector, DetectorStatus, Feature, Layer, Namespace};

pub fn os_release() -> Detector {
    Detector::namespace("os-release", "1.0")
}

pub fn python_ns() -> Detector {
    Detector::namespace("python", "1.0")
}

pub fn dpkg() -> Detector {
    Detector::feature("dpkg", "1.0")
}

pub fn rpm() -> Detector {
    Detector::feature("rpm", "1.0")
}

pub fn pip() -> Detector {
    Detector::feature("pip", "1.0")
}

/// Fluent construction of a [`Layer`] without the validation `LayerBuilder` applies.
pub struct LayerFixture {
    layer: Layer,
}

impl LayerFixture {
    pub fn new(hash: &str) -> Self {
        Self {
            layer: Layer::new(hash),
        }
    }

    pub fn namespace(mut self, detector: Detector, namespace: Namespace) -> Self {
        self.layer
            .namespaces
            .insert(detector, NamespaceDetectResult::found(namespace));
        self
    }

    pub fn no_namespace(mut self, detector: Detector) -> Self {
        self.layer.namespaces.insert(
            detector,
            NamespaceDetectResult::with_status(DetectorStatus::NotFound),
        );
        self
    }

    pub fn features(mut self, detector: Detector, features: Vec<Feature>) -> Self {
        self.layer
            .features
            .insert(detector, FeatureDetectResult::found(features));
        self
    }

    pub fn build(self) -> Layer {
        self.layer
    }
}

pub fn rpm_pkg(name: &str, version: &str) -> Feature {
    Feature::binary(name, version, "rpm")
}

pub fn deb_pkg(name: &str, version: &str) -> Feature {
    Feature::binary(name, version, "dpkg")
}

pub fn py_pkg(name: &str, version: &str) -> Feature {
    Feature::source(name, version, "pep440")
}

/// `(layer hash, feature name, feature version, namespace name:version)` for every
/// attributed feature, sorted.
pub fn attribution(ancestry: &strata::Ancestry) -> Vec<(String, String, String, String)> {
    let mut rows: Vec<_> = ancestry
        .layers
        .iter()
        .flat_map(|layer| {
            layer.features.iter().map(move |f| {
                (
                    layer.hash.clone(),
                    f.feature.name.clone(),
                    f.feature.version.clone(),
                    f.namespace.to_string(),
                )
            })
        })
        .collect();
    rows.sort();
    rows
}

pub fn row(hash: &str, name: &str, version: &str, ns: &str) -> (String, String, String, String) {
    (
        hash.to_string(),
        name.to_string(),
        version.to_string(),
        ns.to_string(),
    )
}
