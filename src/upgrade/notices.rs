//! Version-tagged upgrade notices shown after a successful update.
//!
//! Some releases need the user to do something after updating (rerun a
//! migration, refresh state). Those messages are registered against the
//! version that introduced them; after an update the engine surfaces every
//! notice whose version lies in the half-open range
//! `(current, target]`, in ascending version order, so a user jumping
//! several versions sees every intervening notice rather than only the
//! latest one.

use semver::Version;
use std::collections::HashMap;
use tracing::warn;

use crate::version::VersionComparator;

/// Mapping from version string to a human-readable upgrade notice.
///
/// Entries are unordered as authored; [`applicable`](Self::applicable)
/// processes them in ascending version order. Keys that fail to parse are
/// logged and skipped, never fatal.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    entries: HashMap<String, String>,
}

impl AnnotationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The notices that ship with skiff itself.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("0.2.0", "Configuration moved to ~/.skiff/config.toml; rerun `skiff init` once.");
        table.insert("0.3.0", "Tool manifests are now fetched lazily; run `skiff sync` after updating.");
        table
    }

    /// Register a notice for the release that introduced it.
    pub fn insert(&mut self, version: impl Into<String>, notice: impl Into<String>) {
        self.entries.insert(version.into(), notice.into());
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ordered notices that apply when updating `current` → `target`.
    ///
    /// A notice applies when its version is strictly greater than `current`
    /// and less than or equal to `target`. The ascending walk stops at the
    /// first version beyond `target`; the sort guarantees everything after
    /// it is farther out.
    pub fn applicable(&self, current: &Version, target: &Version) -> Vec<String> {
        let mut parsed: Vec<(Version, &str)> = self
            .entries
            .iter()
            .filter_map(|(key, notice)| match VersionComparator::parse(key) {
                Ok(version) => Some((version, notice.as_str())),
                Err(_) => {
                    warn!("ignoring upgrade notice with unparsable version '{key}'");
                    None
                }
            })
            .collect();
        parsed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut notices = Vec::new();
        for (version, notice) in parsed {
            if VersionComparator::greater_than(&version, target) {
                break;
            }
            if VersionComparator::greater_than(&version, current) {
                notices.push(notice.to_string());
            }
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn fixture() -> AnnotationTable {
        let mut table = AnnotationTable::new();
        table.insert("1.2.0", "A");
        table.insert("1.3.0", "B");
        table.insert("2.0.0", "C");
        table
    }

    #[test]
    fn test_range_filtering_and_order() {
        let notices = fixture().applicable(&v("1.1.0"), &v("1.3.0"));
        assert_eq!(notices, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_target_boundary_inclusive() {
        let notices = fixture().applicable(&v("1.1.0"), &v("2.0.0"));
        assert_eq!(notices, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_current_boundary_exclusive() {
        let notices = fixture().applicable(&v("1.2.0"), &v("1.3.0"));
        assert_eq!(notices, vec!["B".to_string()]);
    }

    #[test]
    fn test_no_applicable_notices() {
        let notices = fixture().applicable(&v("2.0.0"), &v("2.1.0"));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_unparsable_key_skipped() {
        let mut table = fixture();
        table.insert("not-a-version", "never shown");

        let notices = table.applicable(&v("1.0.0"), &v("9.9.9"));
        assert_eq!(notices, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_empty_table() {
        let table = AnnotationTable::new();
        assert!(table.is_empty());
        assert!(table.applicable(&v("1.0.0"), &v("2.0.0")).is_empty());
    }

    #[test]
    fn test_builtin_table_parses() {
        // Every shipped key must parse, or the notice can never fire.
        let table = AnnotationTable::builtin();
        let all = table.applicable(&v("0.0.1"), &v("99.0.0"));
        assert_eq!(all.len(), 2);
    }
}
