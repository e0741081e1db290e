use serde::{Deserialize, Serialize};
use std::fmt;

/// The OS or language distribution that gives a feature's version string meaning,
/// e.g. `debian:9` with version format `dpkg`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub version: String,
    pub version_format: String,
}

impl Namespace {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        version_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            version_format: version_format.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty() && !self.version_format.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(Namespace::new("centos", "7", "rpm").is_valid());
        assert!(!Namespace::new("", "7", "rpm").is_valid());
        assert!(!Namespace::new("centos", "", "rpm").is_valid());
        assert!(!Namespace::new("centos", "7", "").is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::new("debian", "9", "dpkg").to_string(), "debian:9");
    }
}
