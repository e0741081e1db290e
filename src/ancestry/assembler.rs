//! Turns the builder's running state into per-layer feature attribution.

use super::tracking::{FeatureTable, NamespaceTable};
use crate::model::{AncestryFeature, AncestryLayer};

/// Groups every live tracked feature under the layer that introduced it.
///
/// Namespaces are looked up by detector at assembly time, so a feature reports the
/// namespace its detector holds now, not the one it held when the feature appeared.
///
/// # Panics
///
/// Panics if a tracked feature refers to a namespace detector with no current value or
/// to a layer index outside `layer_hashes`. Either means the tables have diverged.
pub fn assemble_layers(
    layer_hashes: &[String],
    features: &FeatureTable,
    namespaces: &NamespaceTable,
) -> Vec<AncestryLayer> {
    let mut layers: Vec<AncestryLayer> = layer_hashes
        .iter()
        .map(|hash| AncestryLayer::new(hash.clone()))
        .collect();

    for (detector, tracked) in features.iter() {
        let namespace = match namespaces.current(&tracked.namespace_key) {
            Some(namespace) => namespace,
            None => panic!(
                "namespace detector {} is missing for feature {} tracked by {}",
                tracked.namespace_key, tracked.feature, detector
            ),
        };

        let layer = match layers.get_mut(tracked.introduced_in) {
            Some(layer) => layer,
            None => panic!(
                "feature {} introduced in layer {} but only {} layers were added",
                tracked.feature,
                tracked.introduced_in,
                layer_hashes.len()
            ),
        };

        layer.features.push(AncestryFeature {
            feature: tracked.feature.clone(),
            namespace: namespace.namespace.clone(),
            feature_by: detector.clone(),
            namespace_by: tracked.namespace_key.clone(),
        });
    }

    layers
}
