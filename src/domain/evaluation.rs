//! Compliance decision result types

use chrono::NaiveDateTime;
use pep508_rs::PackageName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared version older than the window, with its replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedEntry {
    /// Package name as declared
    pub package: String,
    /// Normalized declared version
    pub declared_version: String,
    /// When the declared version was first published
    pub declared_published_at: NaiveDateTime,
    /// Oldest version still inside the window
    pub replacement_version: String,
}

impl OutdatedEntry {
    /// Creates a new outdated entry
    pub fn new(
        package: impl Into<String>,
        declared_version: impl Into<String>,
        declared_published_at: NaiveDateTime,
        replacement_version: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            declared_version: declared_version.into(),
            declared_published_at,
            replacement_version: replacement_version.into(),
        }
    }

    /// Normalized identity of the package, if its name is valid
    pub fn key(&self) -> Option<PackageName> {
        self.package.parse().ok()
    }
}

impl fmt::Display for OutdatedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} >= {} (released {}), oldest compliant: {}",
            self.package,
            self.declared_version,
            self.declared_published_at.date(),
            self.replacement_version
        )
    }
}

/// Reason a package could not be classified or fixed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No `>=` or `==` bound was declared
    NoVersion,
    /// The index lookup failed
    LookupFailed(String),
    /// The declared version is not listed (or has no files)
    UnknownVersion,
    /// Outdated, but nothing was published inside the window
    NoCompliantVersion,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoVersion => write!(f, "no version bound"),
            UnresolvedReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            UnresolvedReason::UnknownVersion => write!(f, "release date unknown"),
            UnresolvedReason::NoCompliantVersion => write!(f, "no compliant version found"),
        }
    }
}

/// Result of evaluating a single declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evaluation {
    /// Declared version is inside the window
    Compliant {
        package: String,
        version: String,
        published_at: NaiveDateTime,
    },
    /// Declared version is too old and a replacement exists
    Outdated(OutdatedEntry),
    /// Could not be decided or fixed
    Unresolved {
        package: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        reason: UnresolvedReason,
    },
}

impl Evaluation {
    /// Creates an Unresolved result
    pub fn unresolved(
        package: impl Into<String>,
        version: Option<String>,
        reason: UnresolvedReason,
    ) -> Self {
        Evaluation::Unresolved {
            package: package.into(),
            version,
            reason,
        }
    }

    /// Returns the package name
    pub fn package(&self) -> &str {
        match self {
            Evaluation::Compliant { package, .. } => package,
            Evaluation::Outdated(entry) => &entry.package,
            Evaluation::Unresolved { package, .. } => package,
        }
    }

    /// Returns the outdated entry, if any
    pub fn outdated(&self) -> Option<&OutdatedEntry> {
        match self {
            Evaluation::Outdated(entry) => Some(entry),
            _ => None,
        }
    }

    /// Returns true if the declared version is compliant
    pub fn is_compliant(&self) -> bool {
        matches!(self, Evaluation::Compliant { .. })
    }
}
