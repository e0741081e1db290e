//! strata - layer-by-layer package inventory reconciliation for container images
//!
//! A container image is a stack of layers, and every layer can install, upgrade or
//! remove packages. Scanning each layer on its own tells you what is present at that
//! point of the stack; strata folds those per-layer scan results, base layer first,
//! into an [`Ancestry`]: the ordered layers, each carrying the packages it introduced
//! and the namespace (operating system or language ecosystem) each package belongs to.
//!
//! # Core Concepts
//!
//! - **Detector**: a named, versioned scanner that finds either namespaces or features
//! - **Layer**: one layer's scan result, keyed by detector
//! - **Ancestry**: the reconciled image, with every feature attributed to the layer
//!   that introduced it
//!
//! # Example Usage
//!
//! ```
//! use strata::{compute_ancestry, DetectorPolicy, Detector, Feature, Layer, Namespace};
//! use strata::model::{FeatureDetectResult, NamespaceDetectResult};
//!
//! let os = Detector::namespace("os-release", "1.0");
//! let rpm = Detector::feature("rpm", "1.0");
//!
//! let mut base = Layer::new("sha256:base");
//! base.namespaces.insert(
//!     os.clone(),
//!     NamespaceDetectResult::found(Namespace::new("centos", "7", "rpm")),
//! );
//! base.features.insert(
//!     rpm.clone(),
//!     FeatureDetectResult::found(vec![Feature::binary("openssl", "1.0.2k", "rpm")]),
//! );
//!
//! let ancestry = compute_ancestry("my-image", &[base], DetectorPolicy::Lenient).unwrap();
//! assert_eq!(ancestry.feature_count(), 1);
//! ```
//!
//! # Project Structure
//!
//! - [`model`]: detectors, features, namespaces, layers and ancestries
//! - [`ancestry`]: the reconciliation engine
//! - [`detectors`]: detector traits and the registry
//! - [`scan`]: producing and auditing per-layer scan results
//! - [`cli`]: command-line surface

pub mod ancestry;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod model;
pub mod scan;
pub mod util;

pub use ancestry::{compute_ancestry, AncestryBuilder, AncestryError, DetectorPolicy};
pub use config::{ConfigError, OutputFormat, StrataConfig};
pub use detectors::{DetectorRegistry, FeatureDetector, NamespaceDetector, RegistryError};
pub use model::{
    Ancestry, AncestryFeature, AncestryLayer, Detector, DetectorKind, DetectorStatus, Feature,
    FeatureKind, Layer, Namespace, NamespacedFeature,
};
pub use scan::{audit_layer, scan_layer, LayerBuilder, LayerError, ScanError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
