use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a package is a source package or a binary built from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Source,
    Binary,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Source => write!(f, "source"),
            FeatureKind::Binary => write!(f, "binary"),
        }
    }
}

/// An installed software package as reported by a feature detector.
///
/// Equality is structural; two features are the same package only if every field
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub version: String,
    pub version_format: String,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        version_format: impl Into<String>,
        kind: FeatureKind,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            version_format: version_format.into(),
            kind,
        }
    }

    pub fn source(
        name: impl Into<String>,
        version: impl Into<String>,
        version_format: impl Into<String>,
    ) -> Self {
        Self::new(name, version, version_format, FeatureKind::Source)
    }

    pub fn binary(
        name: impl Into<String>,
        version: impl Into<String>,
        version_format: impl Into<String>,
    ) -> Self {
        Self::new(name, version, version_format, FeatureKind::Binary)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.name, self.version, self.version_format, self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Feature::binary("openssl", "1.1.1k", "rpm");
        let b = Feature::binary("openssl", "1.1.1k", "rpm");
        let c = Feature::source("openssl", "1.1.1k", "rpm");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let f = Feature::source("bash", "5.1-2", "dpkg");
        assert_eq!(f.to_string(), "bash 5.1-2 (dpkg, source)");
    }
}
