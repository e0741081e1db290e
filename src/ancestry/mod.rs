//! Reconciliation of per-layer scan results into an image [`Ancestry`].
//!
//! A package can be added, upgraded or removed by any layer, so the inventory of an
//! image is only known after walking its layers base to leaf:
//!
//! - [`tracking`]: arena tables of tracked namespaces and features
//! - [`resolver`]: picks the namespace detector for a newly seen feature
//! - [`builder`]: consumes layers in order and owns the tables
//! - [`assembler`]: groups tracked features under the layer that introduced them

pub mod assembler;
pub mod builder;
pub mod resolver;
pub mod tracking;

pub use assembler::assemble_layers;
pub use builder::{AncestryBuilder, AncestryError, DetectorPolicy};
pub use resolver::resolve_namespace_key;
pub use tracking::{FeatureTable, NamespaceTable, ReconcileStats, TrackedFeature, TrackedNamespace};

use crate::model::{Ancestry, Layer};

/// Folds `layers`, base first, through a fresh builder.
pub fn compute_ancestry(
    name: impl Into<String>,
    layers: &[Layer],
    policy: DetectorPolicy,
) -> Result<Ancestry, AncestryError> {
    let mut builder = AncestryBuilder::new(name).with_policy(policy);
    for layer in layers {
        builder.add_layer(layer)?;
    }
    Ok(builder.ancestry())
}
