//! Release history from the package index
//!
//! This module provides the ReleaseRecord and ReleaseHistory structs that
//! represent the published versions of a package with their first
//! publication time.

use chrono::NaiveDateTime;
use pep508_rs::pep440_rs::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A published version with its first publication time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// The version string as listed by the index
    pub version: String,
    /// Earliest upload time among the version's files
    pub published_at: NaiveDateTime,
}

impl ReleaseRecord {
    /// Create a new ReleaseRecord
    pub fn new(version: impl Into<String>, published_at: NaiveDateTime) -> Self {
        Self {
            version: version.into(),
            published_at,
        }
    }
}

/// All known releases of one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseHistory {
    package: String,
    releases: BTreeMap<String, NaiveDateTime>,
}

impl ReleaseHistory {
    /// Create an empty history for a package
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            releases: BTreeMap::new(),
        }
    }

    /// Record a version; an earlier time for an existing version wins
    pub fn insert(&mut self, version: impl Into<String>, published_at: NaiveDateTime) {
        self.releases
            .entry(version.into())
            .and_modify(|current| {
                if published_at < *current {
                    *current = published_at;
                }
            })
            .or_insert(published_at);
    }

    /// Builder-style insert
    pub fn with_release(mut self, version: impl Into<String>, published_at: NaiveDateTime) -> Self {
        self.insert(version, published_at);
        self
    }

    /// Package this history belongs to
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Number of known releases
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Returns true if no release is known
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Iterate over all release records
    pub fn records(&self) -> impl Iterator<Item = ReleaseRecord> + '_ {
        self.releases
            .iter()
            .map(|(version, published_at)| ReleaseRecord::new(version, *published_at))
    }

    /// Publication time of a specific version
    ///
    /// The normalized spelling is tried first, then any key that parses to
    /// an equal PEP 440 version.
    pub fn publication_time(&self, version: &Version) -> Option<NaiveDateTime> {
        if let Some(time) = self.releases.get(&version.to_string()) {
            return Some(*time);
        }
        self.releases
            .iter()
            .find(|(key, _)| Version::from_str(key).is_ok_and(|parsed| &parsed == version))
            .map(|(_, time)| *time)
    }
}

/// Compare two version strings, PEP 440 ordering first, text ordering for legacy versions
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::from_str(a), Version::from_str(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_keeps_earliest_time() {
        let mut history = ReleaseHistory::new("requests");
        history.insert("2.31.0", at(10));
        history.insert("2.31.0", at(5));
        history.insert("2.31.0", at(20));

        assert_eq!(history.len(), 1);
        let version = Version::from_str("2.31.0").unwrap();
        assert_eq!(history.publication_time(&version), Some(at(5)));
    }

    #[test]
    fn test_publication_time_normalized_lookup() {
        let history = ReleaseHistory::new("pkg").with_release("1.0a", at(3));
        let version = Version::from_str("1.0a0").unwrap();
        assert_eq!(history.publication_time(&version), Some(at(3)));
    }

    #[test]
    fn test_publication_time_missing() {
        let history = ReleaseHistory::new("pkg").with_release("1.0.0", at(3));
        let version = Version::from_str("9.9.9").unwrap();
        assert!(history.publication_time(&version).is_none());
    }

    #[test]
    fn test_records() {
        let history = ReleaseHistory::new("pkg")
            .with_release("1.0.0", at(1))
            .with_release("1.1.0", at(2));
        let records: Vec<_> = history.records().collect();
        assert_eq!(records.len(), 2);
        assert!(records.contains(&ReleaseRecord::new("1.1.0", at(2))));
        assert_eq!(history.package(), "pkg");
        assert!(!history.is_empty());
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0", "2.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0rc1", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("10.0.0", "9.0.0"), Ordering::Greater);
    }
}
