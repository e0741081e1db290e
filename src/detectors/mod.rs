//! Pluggable namespace and feature detectors.
//!
//! Detectors are registered on a [`DetectorRegistry`] value during startup. The
//! registry is then shared read-only (`&DetectorRegistry` or `Arc<DetectorRegistry>`)
//! by every concurrent layer scan.

pub mod registry;

pub use registry::{DetectorRegistry, RegistryError};

use crate::model::{FeatureDetectResult, NamespaceDetectResult};
use anyhow::Result;
use std::collections::BTreeMap;

/// The files of one layer a detector may inspect, keyed by path without a leading `/`.
pub type FilesMap = BTreeMap<String, Vec<u8>>;

/// Determines the namespace of a layer from its files.
#[cfg_attr(test, mockall::automock)]
pub trait NamespaceDetector: Send + Sync {
    fn detect(&self, files: &FilesMap) -> Result<NamespaceDetectResult>;

    /// Paths this detector needs present in the [`FilesMap`] passed to `detect`.
    fn required_files(&self) -> Vec<String>;
}

/// Lists the packages installed in a layer from its files.
#[cfg_attr(test, mockall::automock)]
pub trait FeatureDetector: Send + Sync {
    fn detect(&self, files: &FilesMap) -> Result<FeatureDetectResult>;

    fn required_files(&self) -> Vec<String>;
}
