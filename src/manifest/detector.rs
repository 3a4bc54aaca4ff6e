//! Declaration file detection
//!
//! Looks for requirements.txt, pyproject.toml and setup.py directly inside
//! the target directory. Each is optional.

use crate::domain::DeclarationSyntax;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A declaration file found in the target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationFile {
    /// Path to the file
    pub path: PathBuf,
    /// Syntax the file is written in
    pub syntax: DeclarationSyntax,
}

impl DeclarationFile {
    /// Create a new DeclarationFile
    pub fn new(path: impl Into<PathBuf>, syntax: DeclarationSyntax) -> Self {
        Self {
            path: path.into(),
            syntax,
        }
    }
}

/// Detect declaration files in the given directory, in processing order
pub fn detect_declaration_files(dir: &Path) -> Vec<DeclarationFile> {
    DeclarationSyntax::all()
        .iter()
        .map(|syntax| DeclarationFile::new(dir.join(syntax.file_name()), *syntax))
        .filter(|file| {
            let found = file.path.is_file();
            if !found {
                debug!("No {} in {}", file.syntax, dir.display());
            }
            found
        })
        .collect()
}
