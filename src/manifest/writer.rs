//! Declaration file reading and rewriting
//!
//! This module provides:
//! - DeclarationWriter for applying replacement versions to declaration files
//! - Dry-run mode support (changes are computed and reported, never written)
//! - Whole-file read then whole-file write

use crate::domain::{Declaration, DeclarationSyntax, OutdatedEntry};
use crate::error::ManifestError;
use crate::manifest::{get_format, DeclarationFile, LineChange};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writer for declaration files
pub struct DeclarationWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of rewriting a declaration file
#[derive(Debug, Clone, Serialize)]
pub struct RewriteResult {
    /// Path to the declaration file
    pub path: PathBuf,
    /// Syntax of the file
    pub syntax: DeclarationSyntax,
    /// Lines that changed (or would change under dry-run)
    pub changes: Vec<LineChange>,
    /// Whether the file was actually written
    pub file_modified: bool,
    /// Errors encountered while processing the file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RewriteResult {
    fn new(file: &DeclarationFile) -> Self {
        Self {
            path: file.path.clone(),
            syntax: file.syntax,
            changes: Vec::new(),
            file_modified: false,
            errors: Vec::new(),
        }
    }

    /// Returns true if any line changed
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Returns true if any errors occurred
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl DeclarationWriter {
    /// Create a new DeclarationWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a DeclarationWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Rewrite one declaration file for the given outdated entries
    pub fn apply(
        &self,
        file: &DeclarationFile,
        outdated: &[OutdatedEntry],
    ) -> Result<RewriteResult, ManifestError> {
        let mut result = RewriteResult::new(file);
        if outdated.is_empty() {
            return Ok(result);
        }

        let content = read_declaration_file(&file.path)?;
        let rewrite = get_format(file.syntax).rewrite(&content, outdated);

        for change in &rewrite.changes {
            info!(
                "{}: {} \u{2192} {}",
                file.path.display(),
                change.old.trim(),
                change.new.trim()
            );
        }

        if rewrite.has_changes() && !self.dry_run {
            write_declaration_file(&file.path, &rewrite.content)?;
            result.file_modified = true;
        }

        result.changes = rewrite.changes;
        Ok(result)
    }

    /// Rewrite every file, recording per-file failures instead of stopping
    pub fn apply_all(
        &self,
        files: &[DeclarationFile],
        outdated: &[OutdatedEntry],
    ) -> Vec<RewriteResult> {
        files
            .iter()
            .map(|file| {
                self.apply(file, outdated).unwrap_or_else(|e| {
                    let mut result = RewriteResult::new(file);
                    result.errors.push(format!("Failed to rewrite: {}", e));
                    result
                })
            })
            .collect()
    }
}

/// Read and parse the declarations of one file
pub fn read_declarations(file: &DeclarationFile) -> Result<Vec<Declaration>, ManifestError> {
    let content = read_declaration_file(&file.path)?;
    get_format(file.syntax).parse(&file.path, &content)
}

/// Read a declaration file content
pub fn read_declaration_file(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a declaration file
pub fn write_declaration_file(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn entry(package: &str, old: &str, new: &str) -> OutdatedEntry {
        let released = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        OutdatedEntry::new(package, old, released, new)
    }

    fn requirements(dir: &TempDir, content: &str) -> DeclarationFile {
        let path = dir.path().join("requirements.txt");
        fs::write(&path, content).unwrap();
        DeclarationFile::new(path, DeclarationSyntax::RequirementsTxt)
    }

    #[test]
    fn test_declaration_writer_new() {
        assert!(!DeclarationWriter::new(false).is_dry_run());
        assert!(DeclarationWriter::new(true).is_dry_run());
        assert!(DeclarationWriter::dry_run().is_dry_run());
    }

    #[test]
    fn test_apply_dry_run_reports_but_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let original = "foo>=1.0.0\nbar>=3.0\n";
        let file = requirements(&temp_dir, original);

        let result = DeclarationWriter::dry_run()
            .apply(&file, &[entry("foo", "1.0.0", "1.4.2")])
            .unwrap();

        assert!(result.has_changes());
        assert!(!result.file_modified);
        assert_eq!(result.changes[0].new, "foo>=1.4.2");
        assert_eq!(fs::read_to_string(&file.path).unwrap(), original);
    }

    #[test]
    fn test_apply_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = requirements(&temp_dir, "# core\nfoo>=1.0.0\n\nbar>=3.0\n");

        let result = DeclarationWriter::new(false)
            .apply(&file, &[entry("foo", "1.0.0", "1.4.2")])
            .unwrap();

        assert!(result.file_modified);
        assert_eq!(
            fs::read_to_string(&file.path).unwrap(),
            "# core\nfoo>=1.4.2\n\nbar>=3.0\n"
        );
    }

    #[test]
    fn test_apply_without_matches_leaves_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = requirements(&temp_dir, "bar>=3.0\n");

        let result = DeclarationWriter::new(false)
            .apply(&file, &[entry("foo", "1.0.0", "1.4.2")])
            .unwrap();

        assert!(!result.has_changes());
        assert!(!result.file_modified);
    }

    #[test]
    fn test_apply_all_records_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let present = requirements(&temp_dir, "foo==1.0.0\n");
        let missing = DeclarationFile::new(
            temp_dir.path().join("setup.py"),
            DeclarationSyntax::SetupPy,
        );

        let results = DeclarationWriter::new(false)
            .apply_all(&[present, missing], &[entry("foo", "1.0.0", "1.4.2")]);

        assert_eq!(results.len(), 2);
        assert!(results[0].file_modified);
        assert!(!results[0].has_errors());
        assert!(results[1].has_errors());
    }

    #[test]
    fn test_read_declarations() {
        let temp_dir = TempDir::new().unwrap();
        let file = requirements(&temp_dir, "foo>=1.0.0\n# comment\nbar\n");
        let declarations = read_declarations(&file).unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].location.line, 2);
    }

    #[test]
    fn test_read_declaration_file_not_found() {
        let result = read_declaration_file(Path::new("/nonexistent/path/requirements.txt"));
        assert!(matches!(result, Err(ManifestError::ReadError { .. })));
    }
}
