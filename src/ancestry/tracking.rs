//! Arena-backed tables holding the builder's running state.
//!
//! Both tables append records and never rewrite them. A separate index maps each
//! detector to the records that are current, so history stays distinguishable from the
//! live view.

use crate::model::{Detector, Feature, Namespace};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedNamespace {
    pub namespace: Namespace,
    pub introduced_in: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFeature {
    pub feature: Feature,
    /// Namespace detector whose current value contextualizes this feature.
    pub namespace_key: Detector,
    pub introduced_in: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NamespaceRecord {
    detector: Detector,
    tracked: TrackedNamespace,
}

/// Namespaces keyed by namespace detector. At most one record per detector is current.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    records: Vec<NamespaceRecord>,
    current: BTreeMap<Detector, usize>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `namespace` the current value for `detector` unless it already is.
    ///
    /// Returns `true` when a new record was appended.
    pub fn update(&mut self, detector: &Detector, namespace: &Namespace, layer_index: usize) -> bool {
        if let Some(current) = self.current(detector) {
            if current.namespace == *namespace {
                return false;
            }
        }

        self.current.insert(detector.clone(), self.records.len());
        self.records.push(NamespaceRecord {
            detector: detector.clone(),
            tracked: TrackedNamespace {
                namespace: namespace.clone(),
                introduced_in: layer_index,
            },
        });
        true
    }

    pub fn current(&self, detector: &Detector) -> Option<&TrackedNamespace> {
        self.current
            .get(detector)
            .map(|&idx| &self.records[idx].tracked)
    }

    /// Current values in detector order.
    pub fn iter(&self) -> impl Iterator<Item = (&Detector, &TrackedNamespace)> {
        self.current
            .iter()
            .map(|(detector, &idx)| (detector, &self.records[idx].tracked))
    }

    /// Every value `detector` has held, oldest first.
    pub fn history(&self, detector: &Detector) -> impl Iterator<Item = &TrackedNamespace> + '_ {
        let detector = detector.clone();
        self.records
            .iter()
            .filter(move |record| record.detector == detector)
            .map(|record| &record.tracked)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Counts from reconciling one detector's report for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub unresolved: usize,
}

/// Features keyed by feature detector.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    records: Vec<TrackedFeature>,
    live: BTreeMap<Detector, Vec<usize>>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the live set for `detector` with `incoming`.
    ///
    /// Tracked features missing from `incoming` are dropped, tracked features present
    /// in it keep their provenance, and new ones are recorded at `layer_index` when
    /// `resolve` yields a namespace detector for them. Features `resolve` rejects are
    /// left untracked.
    pub fn reconcile<F>(
        &mut self,
        detector: &Detector,
        incoming: &[Feature],
        layer_index: usize,
        mut resolve: F,
    ) -> ReconcileStats
    where
        F: FnMut(&Feature) -> Option<Detector>,
    {
        let mut stats = ReconcileStats::default();

        let mut index: HashSet<&Feature> = HashSet::with_capacity(incoming.len());
        let unique: Vec<&Feature> = incoming.iter().filter(|f| index.insert(*f)).collect();

        let records = &self.records;
        let live = self.live.entry(detector.clone()).or_default();

        let mut kept: HashSet<&Feature> = HashSet::with_capacity(live.len());
        live.retain(|&idx| match index.get(&records[idx].feature) {
            Some(&feature) => {
                kept.insert(feature);
                true
            }
            None => {
                stats.removed += 1;
                false
            }
        });
        stats.unchanged = kept.len();

        for feature in unique {
            if kept.contains(feature) {
                continue;
            }

            match resolve(feature) {
                Some(namespace_key) => {
                    live.push(self.records.len());
                    self.records.push(TrackedFeature {
                        feature: feature.clone(),
                        namespace_key,
                        introduced_in: layer_index,
                    });
                    stats.added += 1;
                }
                None => stats.unresolved += 1,
            }
        }

        stats
    }

    /// Live features in detector order, then in the order they were first tracked.
    pub fn iter(&self) -> impl Iterator<Item = (&Detector, &TrackedFeature)> {
        self.live.iter().flat_map(move |(detector, indices)| {
            indices.iter().map(move |&idx| (detector, &self.records[idx]))
        })
    }

    pub fn get(&self, detector: &Detector, feature: &Feature) -> Option<&TrackedFeature> {
        self.live
            .get(detector)?
            .iter()
            .map(|&idx| &self.records[idx])
            .find(|tracked| tracked.feature == *feature)
    }

    /// Number of live features across all detectors.
    pub fn len(&self) -> usize {
        self.live.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records ever tracked, including dropped ones.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
