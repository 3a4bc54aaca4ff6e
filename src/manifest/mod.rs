//! Declaration file detection, parsing and rewriting
//!
//! This module provides functionality to:
//! - Detect declaration files in a directory
//! - Parse dependency declarations from each supported syntax
//! - Rewrite outdated declarations in place, leaving every other line intact

mod detector;
mod pyproject_toml;
mod requirements_txt;
mod setup_py;
mod writer;

pub use detector::{detect_declaration_files, DeclarationFile};
pub use pyproject_toml::PyprojectTomlFormat;
pub use requirements_txt::RequirementsTxtFormat;
pub use setup_py::SetupPyFormat;
pub use writer::{read_declarations, DeclarationWriter, RewriteResult};

use crate::domain::{Declaration, DeclarationSyntax, OutdatedEntry};
use crate::error::ManifestError;
use serde::Serialize;
use std::path::Path;

/// A single rewritten line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    /// 0-based line index
    pub line: usize,
    /// Line text before the rewrite, without its line ending
    pub old: String,
    /// Line text after the rewrite, without its line ending
    pub new: String,
}

/// Outcome of rewriting one file's content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// New file content
    pub content: String,
    /// Lines that changed
    pub changes: Vec<LineChange>,
}

impl Rewrite {
    /// Returns true if any line changed
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Trait implemented once per declaration syntax
pub trait DeclarationFormat {
    /// Returns the syntax this format handles
    fn syntax(&self) -> DeclarationSyntax;

    /// Parse declarations; malformed entries are logged and skipped
    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Declaration>, ManifestError>;

    /// Rewrite the lines that declare an outdated package
    fn rewrite(&self, content: &str, outdated: &[OutdatedEntry]) -> Rewrite;
}

/// Get the format handler for a syntax
pub fn get_format(syntax: DeclarationSyntax) -> Box<dyn DeclarationFormat> {
    match syntax {
        DeclarationSyntax::RequirementsTxt => Box::new(RequirementsTxtFormat),
        DeclarationSyntax::PyprojectToml => Box::new(PyprojectTomlFormat),
        DeclarationSyntax::SetupPy => Box::new(SetupPyFormat),
    }
}

/// Split content into `(index, body, line ending)` triples
///
/// Joining `body + ending` over all triples reproduces the input exactly.
pub(crate) fn lines_with_endings(content: &str) -> impl Iterator<Item = (usize, &str, &str)> {
    content
        .split_inclusive('\n')
        .enumerate()
        .map(|(index, line)| {
            let body_len = line
                .strip_suffix("\r\n")
                .or_else(|| line.strip_suffix('\n'))
                .map_or(line.len(), str::len);
            let (body, ending) = line.split_at(body_len);
            (index, body, ending)
        })
}

/// Apply a per-line rewrite function over the whole content
pub(crate) fn rewrite_lines<F>(content: &str, mut rewrite_line: F) -> Rewrite
where
    F: FnMut(usize, &str) -> Option<String>,
{
    let mut result = Rewrite {
        content: String::with_capacity(content.len()),
        changes: Vec::new(),
    };

    for (index, body, ending) in lines_with_endings(content) {
        match rewrite_line(index, body) {
            Some(new_body) if new_body != body => {
                result.content.push_str(&new_body);
                result.changes.push(LineChange {
                    line: index,
                    old: body.to_string(),
                    new: new_body,
                });
            }
            _ => result.content.push_str(body),
        }
        result.content.push_str(ending);
    }

    result
}
