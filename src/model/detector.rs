//! Detector identities and detection status values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a detector extracts from a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Extracts the OS or language context of a layer.
    Namespace,
    /// Extracts installed packages.
    Feature,
}

impl DetectorKind {
    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::Namespace => "Namespace",
            DetectorKind::Feature => "Feature",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "namespace" => Some(DetectorKind::Namespace),
            "feature" => Some(DetectorKind::Feature),
            _ => None,
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identity of a namespace or feature detector.
///
/// Detectors are plain values and are used as map keys throughout the crate. The
/// derived ordering compares name first, then version, then kind, which is what the
/// namespace resolver relies on for its tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Detector {
    pub name: String,
    pub version: String,
    pub kind: DetectorKind,
}

impl Detector {
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: DetectorKind) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind,
        }
    }

    pub fn namespace(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, DetectorKind::Namespace)
    }

    pub fn feature(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, DetectorKind::Feature)
    }

    /// A detector is valid when both its name and version are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty()
    }

    pub fn is_namespace_detector(&self) -> bool {
        self.kind == DetectorKind::Namespace
    }

    pub fn is_feature_detector(&self) -> bool {
        self.kind == DetectorKind::Feature
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Detector/{}/{}", self.kind, self.name, self.version)
    }
}

/// Outcome of running one detector over one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorStatus {
    /// The files the detector reads exist and changed in this layer.
    #[default]
    Found,
    /// The files are absent from this layer: either never present or unchanged.
    NotFound,
    /// The files were deleted by a whiteout in this layer.
    Removed,
    /// The files exist but could not be parsed.
    Corrupted,
    /// The detector hit a file that is not allowed to exist.
    Blacklisted,
}

impl fmt::Display for DetectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectorStatus::Found => "found",
            DetectorStatus::NotFound => "not_found",
            DetectorStatus::Removed => "removed",
            DetectorStatus::Corrupted => "corrupted",
            DetectorStatus::Blacklisted => "blacklisted",
        };
        write!(f, "{}", s)
    }
}
