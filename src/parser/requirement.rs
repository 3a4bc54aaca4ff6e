//! PEP 508 requirement string handling
//!
//! Handles requirement formats:
//! - Bare name: `requests`
//! - Lower/exact bound: `requests>=2.28.0`, `requests==2.28.0`
//! - Ranges: `requests>=2.28,<3`
//! - Extras and markers: `httpx[http2]>=0.24; python_version >= '3.8'`
//!
//! Only `>=` and `==` bounds drive the compliance check.

use pep508_rs::pep440_rs::{Operator, Version};
use pep508_rs::{PackageName, Requirement, VerbatimUrl, VersionOrUrl};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

// Package name as written at the start of a requirement
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap());

/// A requirement reduced to what the compliance check needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequirement {
    /// Package name with its original spelling
    pub name: String,
    /// Normalized package identity
    pub package: PackageName,
    /// First `>=` or `==` bound
    pub version: Option<Version>,
}

/// Parse a PEP 508 requirement string
pub fn parse_requirement(text: &str) -> Result<ParsedRequirement, String> {
    let requirement = Requirement::<VerbatimUrl>::from_str(text.trim()).map_err(|e| e.to_string())?;

    let version = match &requirement.version_or_url {
        Some(VersionOrUrl::VersionSpecifier(specifiers)) => specifiers
            .iter()
            .find(|spec| {
                matches!(
                    spec.operator(),
                    Operator::GreaterThanEqual | Operator::Equal
                )
            })
            .map(|spec| spec.version().clone()),
        _ => None,
    };

    let name = NAME_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| requirement.name.to_string());

    Ok(ParsedRequirement {
        name,
        package: requirement.name,
        version,
    })
}

/// Returns true if a version token written in a file denotes the declared version
pub fn same_version(token: &str, declared: &str) -> bool {
    if token == declared {
        return true;
    }
    match (Version::from_str(token), Version::from_str(declared)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
