//! Kubeadm version parsing and API schema selection.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use semver::Version;

use crate::constants::SCHEMA_BOUNDARY;
use crate::error::ProviderError;

/// A semantic version as reported by `kubeadm version -o short`.
///
/// Ordering follows semver precedence, so pre-releases sort before the
/// release they lead up to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KubeVersion(Version);

impl KubeVersion {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// The version at which kubeadm switched to the v1beta4 API.
    #[must_use]
    pub fn schema_boundary() -> Self {
        SCHEMA_BOUNDARY
            .parse()
            .unwrap_or(Self::new(1, 31, 0))
    }
}

impl Deref for KubeVersion {
    type Target = Version;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for KubeVersion {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        Version::parse(bare)
            .map(Self)
            .map_err(|e| ProviderError::VersionParse(format!("{trimmed}: {e}")))
    }
}

impl fmt::Display for KubeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Kubeadm configuration API generation to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSchema {
    /// `kubeadm.k8s.io/v1beta3`, kubeadm below 1.31.
    Legacy,
    /// `kubeadm.k8s.io/v1beta4`, kubeadm 1.31 and later.
    Current,
}

impl ApiSchema {
    /// Pick the schema for an installed kubeadm version.
    #[must_use]
    pub fn for_version(version: &KubeVersion) -> Self {
        match version.cmp(&KubeVersion::schema_boundary()) {
            Ordering::Less => Self::Legacy,
            Ordering::Equal | Ordering::Greater => Self::Current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> KubeVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_short_output() {
        assert_eq!(v("v1.30.11\n"), KubeVersion::new(1, 30, 11));
        assert_eq!(v("1.31.0"), KubeVersion::new(1, 31, 0));
        assert_eq!(v("v1.32.0-rc.1+abc").pre.as_str(), "rc.1");
        assert_eq!(v("  v1.29.4  ").minor, 29);
        assert!("kubeadm: command not found".parse::<KubeVersion>().is_err());
        assert!("".parse::<KubeVersion>().is_err());
        assert!("vv1.30.0".parse::<KubeVersion>().is_err());
        assert!("1.30".parse::<KubeVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(v("v1.30.11") < v("v1.31.0"));
        assert!(v("v1.31.0-alpha.1") < v("v1.31.0"));
        assert!(v("v1.31.0-alpha.2") < v("v1.31.0-beta.1"));
        assert!(v("v1.31.0-rc.2") < v("v1.31.0-rc.10"));
        assert!(v("v2.0.0") > v("v1.99.99"));
    }

    #[test]
    fn test_schema_flips_at_boundary() {
        assert_eq!(ApiSchema::for_version(&v("v1.30.11")), ApiSchema::Legacy);
        assert_eq!(ApiSchema::for_version(&v("v1.31.0-rc.1")), ApiSchema::Legacy);
        assert_eq!(ApiSchema::for_version(&v("v1.31.0")), ApiSchema::Current);
        assert_eq!(ApiSchema::for_version(&v("v1.32.3")), ApiSchema::Current);
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(v("1.30.2").to_string(), "v1.30.2");
        assert_eq!(v("v1.31.0-rc.1").to_string(), "v1.31.0-rc.1");
    }

    #[test]
    fn test_boundary_is_v1_31_0() {
        assert_eq!(KubeVersion::schema_boundary(), KubeVersion::new(1, 31, 0));
        assert!(v("v1.31.0-rc.1") < KubeVersion::schema_boundary());
        assert!(v("v1.31.1") > KubeVersion::schema_boundary());
    }
}
