//! Value types shared by the scanner, the ancestry builder, and its consumers.

pub mod ancestry;
pub mod detector;
pub mod feature;
pub mod layer;
pub mod namespace;

pub use ancestry::{Ancestry, AncestryFeature, AncestryLayer, NamespacedFeature};
pub use detector::{Detector, DetectorKind, DetectorStatus};
pub use feature::{Feature, FeatureKind};
pub use layer::{
    DetectedFeatures, DetectedNamespaces, FeatureDetectResult, Layer, NamespaceDetectResult,
};
pub use namespace::Namespace;
