//! Dependency declaration structures

use crate::parser::ParsedRequirement;
use pep508_rs::pep440_rs::Version;
use pep508_rs::PackageName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The textual conventions a Python project may use to declare dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationSyntax {
    /// One requirement per line (requirements.txt)
    RequirementsTxt,
    /// PEP 621 dependency arrays (pyproject.toml)
    PyprojectToml,
    /// setuptools build script (setup.py)
    SetupPy,
}

impl DeclarationSyntax {
    /// Returns the file name this syntax is read from
    pub fn file_name(&self) -> &'static str {
        match self {
            DeclarationSyntax::RequirementsTxt => "requirements.txt",
            DeclarationSyntax::PyprojectToml => "pyproject.toml",
            DeclarationSyntax::SetupPy => "setup.py",
        }
    }

    /// Returns all supported syntaxes in processing order
    pub fn all() -> &'static [DeclarationSyntax] {
        &[
            DeclarationSyntax::RequirementsTxt,
            DeclarationSyntax::PyprojectToml,
            DeclarationSyntax::SetupPy,
        ]
    }
}

impl fmt::Display for DeclarationSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Where a declaration was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Declaration file path
    pub path: PathBuf,
    /// 0-based line index
    pub line: usize,
}

impl SourceLocation {
    /// Creates a new source location
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// A single dependency declaration read from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Package name as written
    pub name: String,
    /// Normalized package identity (PEP 503)
    pub package: PackageName,
    /// Lower or exact bound (`>=` / `==`), if any
    pub version: Option<Version>,
    /// Where the declaration lives
    pub location: SourceLocation,
    /// Syntax the declaration was written in
    pub syntax: DeclarationSyntax,
}

impl Declaration {
    /// Creates a declaration from a parsed requirement
    pub fn new(
        requirement: ParsedRequirement,
        location: SourceLocation,
        syntax: DeclarationSyntax,
    ) -> Self {
        Self {
            name: requirement.name,
            package: requirement.package,
            version: requirement.version,
            location,
            syntax,
        }
    }

    /// Package identity shared by every spelling of the name
    pub fn key(&self) -> &PackageName {
        &self.package
    }

    /// Returns the declared version string, if any
    pub fn version_string(&self) -> Option<String> {
        self.version.as_ref().map(|v| v.to_string())
    }

    /// Returns the path of the declaring file
    pub fn path(&self) -> &Path {
        &self.location.path
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(
                f,
                "{}>={} [{}:{}]",
                self.name,
                version,
                self.syntax,
                self.location.line + 1
            ),
            None => write!(f, "{} [{}:{}]", self.name, self.syntax, self.location.line + 1),
        }
    }
}
