use super::{Detector, Feature, Namespace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A feature paired with the namespace that contextualizes it. This is the key a
/// vulnerability lookup is performed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedFeature {
    pub feature: Feature,
    pub namespace: Namespace,
}

/// A feature introduced by one ancestry layer, with the detectors that found it and
/// its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryFeature {
    pub feature: Feature,
    pub namespace: Namespace,
    pub feature_by: Detector,
    pub namespace_by: Detector,
}

impl AncestryFeature {
    pub fn namespaced(&self) -> NamespacedFeature {
        NamespacedFeature {
            feature: self.feature.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryLayer {
    pub hash: String,
    pub features: Vec<AncestryFeature>,
}

impl AncestryLayer {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            features: Vec::new(),
        }
    }
}

/// An image as an ordered stack of layers, each listing the features it introduced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ancestry {
    pub name: String,
    pub detectors: Vec<Detector>,
    pub layers: Vec<AncestryLayer>,
}

impl Ancestry {
    pub fn layer(&self, hash: &str) -> Option<&AncestryLayer> {
        self.layers.iter().find(|layer| layer.hash == hash)
    }

    pub fn features(&self) -> impl Iterator<Item = &AncestryFeature> {
        self.layers.iter().flat_map(|layer| layer.features.iter())
    }

    pub fn feature_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.features.len()).sum()
    }

    /// Unique `(feature, namespace)` pairs across the whole image, in layer order.
    pub fn namespaced_features(&self) -> Vec<NamespacedFeature> {
        let mut seen = HashSet::new();
        self.features()
            .map(AncestryFeature::namespaced)
            .filter(|nf| seen.insert(nf.clone()))
            .collect()
    }
}
