//! Relates a feature to the namespace detector whose namespace gives its version
//! meaning.

use super::tracking::NamespaceTable;
use crate::model::{Detector, Feature};

/// Returns the namespace detector whose current namespace shares the feature's version
/// format.
///
/// Candidates are visited in detector order (name, version, kind), so when two
/// namespace detectors report the same version format the first by name wins. `None`
/// means no namespace is available for the feature; callers treat that as a skip, not
/// an error.
pub fn resolve_namespace_key(namespaces: &NamespaceTable, feature: &Feature) -> Option<Detector> {
    namespaces
        .iter()
        .find(|(_, tracked)| tracked.namespace.version_format == feature.version_format)
        .map(|(detector, _)| detector.clone())
}
