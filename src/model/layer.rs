//! Per-layer scan results, keyed by the detector that produced them.

use super::{Detector, DetectorStatus, Feature, Namespace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Features reported by each feature detector for one layer.
pub type DetectedFeatures = BTreeMap<Detector, FeatureDetectResult>;

/// Namespace reported by each namespace detector for one layer.
pub type DetectedNamespaces = BTreeMap<Detector, NamespaceDetectResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureDetectResult {
    #[serde(default)]
    pub status: DetectorStatus,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureDetectResult {
    pub fn found(features: Vec<Feature>) -> Self {
        Self {
            status: DetectorStatus::Found,
            features,
        }
    }

    pub fn with_status(status: DetectorStatus) -> Self {
        Self {
            status,
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamespaceDetectResult {
    #[serde(default)]
    pub status: DetectorStatus,
    #[serde(default)]
    pub namespace: Option<Namespace>,
}

impl NamespaceDetectResult {
    pub fn found(namespace: Namespace) -> Self {
        Self {
            status: DetectorStatus::Found,
            namespace: Some(namespace),
        }
    }

    pub fn with_status(status: DetectorStatus) -> Self {
        Self {
            status,
            namespace: None,
        }
    }
}

/// The scan result of one filesystem layer.
///
/// On the wire both maps are lists of `{ "detector": {..}, "status": .., .. }` entries,
/// since detectors are structured values and cannot be JSON object keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Content hash of the layer blob.
    pub hash: String,
    #[serde(default, with = "detector_entries")]
    pub features: DetectedFeatures,
    #[serde(default, with = "detector_entries")]
    pub namespaces: DetectedNamespaces,
}

impl Layer {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ..Default::default()
        }
    }

    /// Every detector this layer declares, sorted and de-duplicated.
    pub fn detectors(&self) -> Vec<Detector> {
        let set: BTreeSet<&Detector> = self.features.keys().chain(self.namespaces.keys()).collect();
        set.into_iter().cloned().collect()
    }

    /// Unique features across all feature detectors, in detector order.
    pub fn all_unique_features(&self) -> Vec<Feature> {
        let mut seen = HashSet::new();
        self.features
            .values()
            .flat_map(|result| result.features.iter())
            .filter(|feature| seen.insert(*feature))
            .cloned()
            .collect()
    }

    /// Unique namespaces across all namespace detectors, in detector order.
    pub fn all_unique_namespaces(&self) -> Vec<Namespace> {
        let mut seen = HashSet::new();
        self.namespaces
            .values()
            .filter_map(|result| result.namespace.as_ref())
            .filter(|namespace| seen.insert(*namespace))
            .cloned()
            .collect()
    }
}

mod detector_entries {
    use super::Detector;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct EntryRef<'a, V> {
        detector: &'a Detector,
        #[serde(flatten)]
        result: &'a V,
    }

    #[derive(Deserialize)]
    struct Entry<V> {
        detector: Detector,
        #[serde(flatten)]
        result: V,
    }

    pub fn serialize<S, V>(map: &BTreeMap<Detector, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(
            map.iter()
                .map(|(detector, result)| EntryRef { detector, result }),
        )
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<Detector, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let entries = Vec::<Entry<V>>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for entry in entries {
            if map.contains_key(&entry.detector) {
                return Err(D::Error::custom(format!(
                    "detector {} reported more than once",
                    entry.detector
                )));
            }
            map.insert(entry.detector, entry.result);
        }
        Ok(map)
    }
}
