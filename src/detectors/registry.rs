use super::{FeatureDetector, FilesMap, NamespaceDetector};
use crate::model::{DetectedFeatures, DetectedNamespaces, Detector, DetectorKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Cannot register a detector with an empty name or version")]
    EmptyIdentity,

    #[error("{kind} detector '{name}' is already registered")]
    Duplicate { kind: DetectorKind, name: String },

    #[error("Unknown detector: {0}")]
    UnknownDetector(Detector),

    #[error("Detector {detector} failed")]
    DetectionFailed {
        detector: Detector,
        #[source]
        source: anyhow::Error,
    },
}

struct Registered<T: ?Sized> {
    info: Detector,
    detector: Arc<T>,
}

impl<T: ?Sized> Clone for Registered<T> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            detector: Arc::clone(&self.detector),
        }
    }
}

/// Maps detector identities to their implementations.
///
/// Populate it once at startup, then share it by reference. Lookups take `&self`, so a
/// registry behind an `Arc` can serve concurrent scans without locking.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    namespace_detectors: BTreeMap<String, Registered<dyn NamespaceDetector>>,
    feature_detectors: BTreeMap<String, Registered<dyn FeatureDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_namespace_detector(
        &mut self,
        name: &str,
        version: &str,
        detector: Arc<dyn NamespaceDetector>,
    ) -> Result<Detector, RegistryError> {
        let info = Self::identity(name, version, DetectorKind::Namespace)?;
        if self.namespace_detectors.contains_key(name) {
            return Err(RegistryError::Duplicate {
                kind: DetectorKind::Namespace,
                name: name.to_string(),
            });
        }

        debug!(detector = %info, "Registered detector");
        self.namespace_detectors.insert(
            name.to_string(),
            Registered {
                info: info.clone(),
                detector,
            },
        );
        Ok(info)
    }

    pub fn register_feature_detector(
        &mut self,
        name: &str,
        version: &str,
        detector: Arc<dyn FeatureDetector>,
    ) -> Result<Detector, RegistryError> {
        let info = Self::identity(name, version, DetectorKind::Feature)?;
        if self.feature_detectors.contains_key(name) {
            return Err(RegistryError::Duplicate {
                kind: DetectorKind::Feature,
                name: name.to_string(),
            });
        }

        debug!(detector = %info, "Registered detector");
        self.feature_detectors.insert(
            name.to_string(),
            Registered {
                info: info.clone(),
                detector,
            },
        );
        Ok(info)
    }

    fn identity(name: &str, version: &str, kind: DetectorKind) -> Result<Detector, RegistryError> {
        let info = Detector::new(name, version, kind);
        if !info.is_valid() {
            return Err(RegistryError::EmptyIdentity);
        }
        Ok(info)
    }

    /// All registered detectors, sorted.
    pub fn list(&self) -> Vec<Detector> {
        let mut detectors: Vec<Detector> = self
            .namespace_detectors
            .values()
            .map(|r| r.info.clone())
            .chain(self.feature_detectors.values().map(|r| r.info.clone()))
            .collect();
        detectors.sort();
        detectors
    }

    pub fn contains(&self, detector: &Detector) -> bool {
        match detector.kind {
            DetectorKind::Namespace => self
                .namespace_detectors
                .get(&detector.name)
                .is_some_and(|r| r.info == *detector),
            DetectorKind::Feature => self
                .feature_detectors
                .get(&detector.name)
                .is_some_and(|r| r.info == *detector),
        }
    }

    pub fn len(&self) -> usize {
        self.namespace_detectors.len() + self.feature_detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of the files required by `to_use`, sorted.
    pub fn required_files(&self, to_use: &[Detector]) -> Result<Vec<String>, RegistryError> {
        let mut files = BTreeSet::new();
        for detector in to_use {
            let required = match detector.kind {
                DetectorKind::Namespace => self.namespace(detector)?.required_files(),
                DetectorKind::Feature => self.feature(detector)?.required_files(),
            };
            files.extend(required);
        }
        Ok(files.into_iter().collect())
    }

    /// Runs every namespace detector in `to_use`; feature detectors are skipped.
    pub fn detect_namespaces(
        &self,
        files: &FilesMap,
        to_use: &[Detector],
    ) -> Result<DetectedNamespaces, RegistryError> {
        let mut detected = DetectedNamespaces::new();
        for detector in to_use.iter().filter(|d| d.is_namespace_detector()) {
            let result = self
                .namespace(detector)?
                .detect(files)
                .map_err(|source| RegistryError::DetectionFailed {
                    detector: detector.clone(),
                    source,
                })?;
            detected.insert(detector.clone(), result);
        }
        Ok(detected)
    }

    /// Runs every feature detector in `to_use`; namespace detectors are skipped.
    pub fn detect_features(
        &self,
        files: &FilesMap,
        to_use: &[Detector],
    ) -> Result<DetectedFeatures, RegistryError> {
        let mut detected = DetectedFeatures::new();
        for detector in to_use.iter().filter(|d| d.is_feature_detector()) {
            let result = self
                .feature(detector)?
                .detect(files)
                .map_err(|source| RegistryError::DetectionFailed {
                    detector: detector.clone(),
                    source,
                })?;
            detected.insert(detector.clone(), result);
        }
        Ok(detected)
    }

    fn namespace(&self, detector: &Detector) -> Result<&dyn NamespaceDetector, RegistryError> {
        self.namespace_detectors
            .get(&detector.name)
            .filter(|r| r.info == *detector)
            .map(|r| r.detector.as_ref())
            .ok_or_else(|| RegistryError::UnknownDetector(detector.clone()))
    }

    fn feature(&self, detector: &Detector) -> Result<&dyn FeatureDetector, RegistryError> {
        self.feature_detectors
            .get(&detector.name)
            .filter(|r| r.info == *detector)
            .map(|r| r.detector.as_ref())
            .ok_or_else(|| RegistryError::UnknownDetector(detector.clone()))
    }
}
