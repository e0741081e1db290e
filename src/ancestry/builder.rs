//! Layer-by-layer accumulation of an image's package inventory.

use super::assembler::assemble_layers;
use super::resolver::resolve_namespace_key;
use super::tracking::{FeatureTable, NamespaceTable, TrackedNamespace};
use crate::model::{Ancestry, Detector, DetectorStatus, Feature, Layer, Namespace};
use crate::scan::{audit_layer, LayerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AncestryError {
    /// A layer declared a different detector set than the first layer
    #[error(
        "Layer {index} ({hash}) declares {} detectors, expected the {} declared by the first layer",
        .found.len(),
        .expected.len()
    )]
    InconsistentDetectorSet {
        index: usize,
        hash: String,
        expected: Vec<Detector>,
        found: Vec<Detector>,
    },

    /// A layer carried a malformed detector or namespace entry
    #[error("Layer {index} ({hash}) is malformed: {source}")]
    MalformedLayer {
        index: usize,
        hash: String,
        #[source]
        source: LayerError,
    },
}

/// How the builder treats a layer whose detector set differs from the first layer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorPolicy {
    /// Accept the layer and log a warning.
    #[default]
    Lenient,
    /// Reject the layer with [`AncestryError::InconsistentDetectorSet`].
    Strict,
}

impl DetectorPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "lenient" => Some(DetectorPolicy::Lenient),
            "strict" => Some(DetectorPolicy::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for DetectorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorPolicy::Lenient => write!(f, "lenient"),
            DetectorPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Builds an [`Ancestry`] from layer scan results fed base layer first.
///
/// One builder serves one image. Layers are indexed in the order they are added.
/// [`AncestryBuilder::ancestry`] can be called at any point and returns an owned
/// snapshot; adding more layers afterwards affects later snapshots only.
///
/// # Example
///
/// ```
/// use strata::ancestry::AncestryBuilder;
/// use strata::model::{Detector, Feature, FeatureDetectResult, Layer, Namespace, NamespaceDetectResult};
///
/// let mut layer = Layer::new("sha256:base");
/// layer.namespaces.insert(
///     Detector::namespace("os-release", "1.0"),
///     NamespaceDetectResult::found(Namespace::new("centos", "7", "rpm")),
/// );
/// layer.features.insert(
///     Detector::feature("rpm", "1.0"),
///     FeatureDetectResult::found(vec![Feature::binary("openssl", "1.0.2k", "rpm")]),
/// );
///
/// let mut builder = AncestryBuilder::new("my-image");
/// builder.add_layer(&layer).unwrap();
///
/// let ancestry = builder.ancestry();
/// assert_eq!(ancestry.layers[0].features[0].namespace.version, "7");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AncestryBuilder {
    name: String,
    policy: DetectorPolicy,
    layer_hashes: Vec<String>,
    detectors: Vec<Detector>,
    namespaces: NamespaceTable,
    features: FeatureTable,
}

impl AncestryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: DetectorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Consumes the scan result of the next layer up the stack.
    ///
    /// Namespaces are updated first so features of this layer can resolve against
    /// them. Then each feature detector that reported [`DetectorStatus::Found`] has its
    /// tracked set replaced: missing features are dropped, new ones are recorded at
    /// this layer's index, and unchanged ones keep the index they already had. New
    /// features without a namespace of matching version format are skipped.
    ///
    /// [`DetectorStatus::Removed`] empties the detector's tracked set. Any other
    /// status means the package database was not touched by this layer, so tracked
    /// features carry over. Entries with an invalid detector, a detector of the wrong
    /// kind or an invalid namespace are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Only under [`DetectorPolicy::Strict`], when the layer's detectors differ from
    /// the first layer's or the layer has malformed entries. The builder is left
    /// untouched in that case.
    pub fn add_layer(&mut self, layer: &Layer) -> Result<(), AncestryError> {
        let index = self.layer_count();
        let declared = layer.detectors();

        if self.policy == DetectorPolicy::Strict {
            if let Some(problem) = audit_layer(layer).into_iter().next() {
                return Err(AncestryError::MalformedLayer {
                    index,
                    hash: layer.hash.clone(),
                    source: problem,
                });
            }
        }

        if index == 0 {
            self.detectors = declared;
        } else if declared != self.detectors {
            match self.policy {
                DetectorPolicy::Strict => {
                    return Err(AncestryError::InconsistentDetectorSet {
                        index,
                        hash: layer.hash.clone(),
                        expected: self.detectors.clone(),
                        found: declared,
                    });
                }
                DetectorPolicy::Lenient => warn!(
                    ancestry = %self.name,
                    layer = %layer.hash,
                    index,
                    expected = self.detectors.len(),
                    found = declared.len(),
                    "Layer declares a different detector set than the base layer"
                ),
            }
        }

        for (detector, result) in &layer.namespaces {
            let Some(namespace) = &result.namespace else {
                continue;
            };
            if !detector.is_valid() || !detector.is_namespace_detector() || !namespace.is_valid()
            {
                warn!(
                    layer = %layer.hash,
                    %detector,
                    %namespace,
                    "Skipping malformed namespace entry"
                );
                continue;
            }
            if self.namespaces.update(detector, namespace, index) {
                debug!(%detector, %namespace, index, "Namespace changed");
            }
        }

        for (detector, result) in &layer.features {
            if !detector.is_valid() || !detector.is_feature_detector() {
                warn!(layer = %layer.hash, %detector, "Skipping malformed feature entry");
                continue;
            }

            let incoming: &[Feature] = match result.status {
                DetectorStatus::Found => &result.features,
                DetectorStatus::Removed => &[],
                DetectorStatus::NotFound
                | DetectorStatus::Corrupted
                | DetectorStatus::Blacklisted => {
                    debug!(%detector, status = %result.status, index, "Keeping tracked features");
                    continue;
                }
            };

            let namespaces = &self.namespaces;
            let stats = self
                .features
                .reconcile(detector, incoming, index, |feature| {
                    let key = resolve_namespace_key(namespaces, feature);
                    if key.is_none() {
                        debug!(%feature, %detector, "No namespace for feature, skipping");
                    }
                    key
                });

            debug!(
                %detector,
                index,
                added = stats.added,
                removed = stats.removed,
                unchanged = stats.unchanged,
                unresolved = stats.unresolved,
                "Reconciled features"
            );
        }

        self.layer_hashes.push(layer.hash.clone());
        Ok(())
    }

    /// Produces a snapshot of the image as built so far.
    pub fn ancestry(&self) -> Ancestry {
        Ancestry {
            name: self.name.clone(),
            detectors: self.detectors.clone(),
            layers: assemble_layers(&self.layer_hashes, &self.features, &self.namespaces),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DetectorPolicy {
        self.policy
    }

    pub fn layer_count(&self) -> usize {
        self.layer_hashes.len()
    }

    /// Detectors declared by the first layer.
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn current_namespace(&self, detector: &Detector) -> Option<&Namespace> {
        self.namespaces
            .current(detector)
            .map(|tracked| &tracked.namespace)
    }

    /// Every namespace `detector` has reported that differed from its previous value.
    pub fn namespace_history(&self, detector: &Detector) -> Vec<&TrackedNamespace> {
        self.namespaces.history(detector).collect()
    }

    /// Index of the layer that most recently introduced `feature` under `detector`.
    pub fn introduced_in(&self, detector: &Detector, feature: &Feature) -> Option<usize> {
        self.features
            .get(detector, feature)
            .map(|tracked| tracked.introduced_in)
    }

    pub fn tracked_feature_count(&self) -> usize {
        self.features.len()
    }
}
