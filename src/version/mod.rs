//! Semantic version parsing, comparison, and build provenance for skiff.
//!
//! This module wraps the [`semver`] crate with the small amount of policy the
//! updater needs: tolerant parsing of the tag formats release pipelines
//! actually produce (`v1.2.3`, `version-1.2.3`, `release-1.2.3`), ordering
//! predicates used to decide whether an update applies, and the
//! [`BuildVersion`] sentinel distinguishing release builds from builds made
//! straight from the source tree.
//!
//! # Examples
//!
//! ```rust
//! use skiff_cli::version::VersionComparator;
//!
//! # fn example() -> anyhow::Result<()> {
//! let a = VersionComparator::parse("v1.2.3")?;
//! let b = VersionComparator::parse("1.10.0")?;
//! assert!(VersionComparator::greater_than(&b, &a));
//! # Ok(())
//! # }
//! ```

use semver::Version;
use std::cmp::Ordering;

use crate::core::SkiffError;

/// Version string embedded at release-build time, absent for source builds.
///
/// Release CI sets `SKIFF_RELEASE` when producing published binaries; a
/// plain `cargo build`/`cargo install` from the repository does not, which is
/// how we know self-update cannot apply.
pub const RELEASE_BUILD_VERSION: Option<&str> = option_env!("SKIFF_RELEASE");

/// Version comparison utilities for semantic version operations.
///
/// All methods are associated functions; the struct carries no state. Parsing
/// strips the common tag prefixes so that GitHub tags and bare versions
/// compare uniformly.
pub struct VersionComparator;

impl VersionComparator {
    /// Parse a version string, tolerating common tag prefixes.
    ///
    /// Accepts `1.2.3`, `v1.2.3`, `version-1.2.3`, and `release-1.2.3`
    /// (including pre-release/build suffixes). Anything else fails with
    /// [`SkiffError::InvalidVersion`].
    pub fn parse(text: &str) -> Result<Version, SkiffError> {
        let stripped = Self::strip_prefix(text);
        Version::parse(stripped).map_err(|source| SkiffError::InvalidVersion {
            input: text.to_string(),
            source,
        })
    }

    /// Total order over versions per semver precedence rules.
    ///
    /// Pre-release versions sort below their release counterpart, so
    /// `1.2.0-rc.1 < 1.2.0`.
    pub fn compare(a: &Version, b: &Version) -> Ordering {
        a.cmp(b)
    }

    /// `a <= b` under semver precedence.
    pub fn less_or_equal(a: &Version, b: &Version) -> bool {
        Self::compare(a, b) != Ordering::Greater
    }

    /// `a > b` under semver precedence.
    pub fn greater_than(a: &Version, b: &Version) -> bool {
        Self::compare(a, b) == Ordering::Greater
    }

    fn strip_prefix(text: &str) -> &str {
        for prefix in ["version-", "release-", "v"] {
            if let Some(rest) = text.strip_prefix(prefix) {
                return rest;
            }
        }
        text
    }
}

/// Provenance of the running binary.
///
/// Release builds carry the version stamped by the release pipeline; source
/// builds carry nothing comparable, and the update flow must refuse to run
/// for them rather than compare against an undefined version. The sentinel
/// is checked *before* the comparator is ever reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildVersion {
    /// A published release build with its stamped version.
    Release(Version),
    /// Built from source; no release version is available.
    FromSource,
}

impl BuildVersion {
    /// Determine the provenance of the current binary from the build-time
    /// environment.
    ///
    /// An absent or empty `SKIFF_RELEASE`, or one that does not parse as a
    /// version, means the binary was not produced by the release pipeline.
    pub fn from_build() -> Self {
        Self::from_env_value(RELEASE_BUILD_VERSION)
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(raw) if !raw.trim().is_empty() => match VersionComparator::parse(raw.trim()) {
                Ok(version) => Self::Release(version),
                Err(_) => Self::FromSource,
            },
            _ => Self::FromSource,
        }
    }

    /// The stamped release version, or [`SkiffError::UnsupportedBuild`] for
    /// source builds.
    pub fn release(&self) -> Result<&Version, SkiffError> {
        match self {
            Self::Release(version) => Ok(version),
            Self::FromSource => Err(SkiffError::UnsupportedBuild),
        }
    }

    /// Whether this is a release build.
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release(_))
    }
}

impl std::fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Release(version) => write!(f, "{version}"),
            Self::FromSource => write!(f, "(source build)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(VersionComparator::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(VersionComparator::parse("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(VersionComparator::parse("version-1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(VersionComparator::parse("release-1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_prerelease() {
        let v = VersionComparator::parse("v1.2.3-rc.1").unwrap();
        assert_eq!(v.pre.as_str(), "rc.1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(VersionComparator::parse("not-a-version").is_err());
        assert!(VersionComparator::parse("1.2").is_err());
        assert!(VersionComparator::parse("").is_err());
    }

    #[test]
    fn test_parse_error_preserves_input() {
        let err = VersionComparator::parse("vNaN").unwrap_err();
        assert!(err.to_string().contains("vNaN"));
    }

    #[test]
    fn test_compare_total_order_properties() {
        let a = Version::new(1, 0, 0);
        let b = Version::new(1, 1, 0);
        let c = Version::new(2, 0, 0);

        // Reflexivity
        assert_eq!(VersionComparator::compare(&a, &a), Ordering::Equal);
        // Antisymmetry
        assert_eq!(VersionComparator::compare(&a, &b), Ordering::Less);
        assert_eq!(VersionComparator::compare(&b, &a), Ordering::Greater);
        // Transitivity
        assert_eq!(VersionComparator::compare(&a, &b), Ordering::Less);
        assert_eq!(VersionComparator::compare(&b, &c), Ordering::Less);
        assert_eq!(VersionComparator::compare(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        let rc = VersionComparator::parse("1.2.0-rc.1").unwrap();
        let release = VersionComparator::parse("1.2.0").unwrap();
        assert!(VersionComparator::greater_than(&release, &rc));
        assert!(VersionComparator::less_or_equal(&rc, &release));
    }

    #[test]
    fn test_predicates() {
        let old = Version::new(0, 9, 0);
        let new = Version::new(1, 0, 0);
        assert!(VersionComparator::less_or_equal(&old, &new));
        assert!(VersionComparator::less_or_equal(&new, &new));
        assert!(VersionComparator::greater_than(&new, &old));
        assert!(!VersionComparator::greater_than(&new, &new));
    }

    #[test]
    fn test_build_version_sentinel() {
        assert_eq!(BuildVersion::from_env_value(None), BuildVersion::FromSource);
        assert_eq!(BuildVersion::from_env_value(Some("")), BuildVersion::FromSource);
        assert_eq!(BuildVersion::from_env_value(Some("  ")), BuildVersion::FromSource);
        assert_eq!(BuildVersion::from_env_value(Some("unset")), BuildVersion::FromSource);
    }

    #[test]
    fn test_build_version_release() {
        let bv = BuildVersion::from_env_value(Some("v0.3.2"));
        assert!(bv.is_release());
        assert_eq!(bv.release().unwrap(), &Version::new(0, 3, 2));
    }

    #[test]
    fn test_source_build_refuses_release() {
        let err = BuildVersion::FromSource.release().unwrap_err();
        assert!(matches!(err, SkiffError::UnsupportedBuild));
    }
}
