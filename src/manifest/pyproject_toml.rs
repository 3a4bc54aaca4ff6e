//! pyproject.toml parser and rewriter for PEP 621 projects
//!
//! Handles:
//! - project.dependencies
//! - project.optional-dependencies (every group)
//!
//! The file is validated with the `toml` crate, then scanned line by line so
//! that rewriting can keep formatting, comments and quoting exactly as written.

use crate::domain::{Declaration, DeclarationSyntax, OutdatedEntry, SourceLocation};
use crate::error::ManifestError;
use crate::manifest::{lines_with_endings, rewrite_lines, DeclarationFormat, Rewrite};
use crate::parser::{parse_requirement, same_version};
use pep508_rs::PackageName;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

/// PEP 621 manifest format
pub struct PyprojectTomlFormat;

// Table header: [project] or [[tool.something]]
static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\[?\s*([^\]]+?)\s*\]\]?\s*(#.*)?$").unwrap());

// Key assigned to an array: dependencies = [
static ARRAY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*([A-Za-z0-9_"'.-]+)\s*=\s*\["#).unwrap());

// Basic or literal TOML string
static STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)"|'([^']*)'"#).unwrap());

// Lower or exact bound inside a requirement string. Group 1 is the character
// before the operator, so `===` and `<==` style runs never match.
static BOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^=<>!~])(>=|==)\s*([0-9A-Za-z.+!_*-]+)").unwrap()
});

/// Part of a line that lies inside a dependency array
#[derive(Debug, Clone, PartialEq, Eq)]
struct ArraySegment {
    line: usize,
    range: Range<usize>,
}

/// Returns true if a dotted key path names a dependency array
fn is_dependency_key(path: &str) -> bool {
    path == "project.dependencies" || path.starts_with("project.optional-dependencies.")
}

/// Locate the end of array content on a line
///
/// Returns the byte offset of the closing `]` (and `true`), or of a comment
/// start / end of line (and `false`). Brackets inside strings do not count.
fn array_content_end(text: &str) -> (usize, bool) {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '#' => return (i, false),
                ']' => return (i, true),
                _ => {}
            },
        }
    }

    (text.len(), false)
}

/// Find every line range that lies inside a dependency array
fn scan_dependency_arrays(content: &str) -> Vec<ArraySegment> {
    let mut segments = Vec::new();
    let mut table = String::new();
    let mut in_array = false;

    for (index, body, _) in lines_with_endings(content) {
        if in_array {
            let (end, closed) = array_content_end(body);
            segments.push(ArraySegment {
                line: index,
                range: 0..end,
            });
            in_array = !closed;
            continue;
        }

        if let Some(caps) = TABLE_RE.captures(body) {
            table = caps[1].replace(['"', '\''], "");
            continue;
        }

        let Some(caps) = ARRAY_KEY_RE.captures(body) else {
            continue;
        };

        let key = caps[1].replace(['"', '\''], "");
        let path = if table.is_empty() {
            key
        } else {
            format!("{}.{}", table, key)
        };

        if !is_dependency_key(&path) {
            continue;
        }

        let start = caps.get(0).map_or(body.len(), |m| m.end());
        let (end, closed) = array_content_end(&body[start..]);
        segments.push(ArraySegment {
            line: index,
            range: start..start + end,
        });
        in_array = !closed;
    }

    segments
}

/// Iterate quoted strings in a segment as `(inner range, inner text)`
fn quoted_strings<'a>(
    body: &'a str,
    range: &Range<usize>,
) -> impl Iterator<Item = (Range<usize>, &'a str)> + 'a {
    let offset = range.start;
    STRING_RE
        .captures_iter(&body[range.clone()])
        .filter_map(move |caps| {
            let inner = caps.get(1).or_else(|| caps.get(2))?;
            let inner_range = offset + inner.start()..offset + inner.end();
            Some((inner_range.clone(), &body[inner_range]))
        })
}

/// Rewrite one requirement string if it declares an outdated version
fn rewrite_requirement(text: &str, outdated: &[(PackageName, &OutdatedEntry)]) -> Option<String> {
    let requirement = parse_requirement(text).ok()?;

    outdated
        .iter()
        .filter(|(key, _)| *key == requirement.package)
        .find_map(|(_, entry)| {
            let bound = BOUND_RE
                .captures_iter(text)
                .find(|caps| same_version(&caps[3], &entry.declared_version))?;
            let start = bound.get(2)?.start();
            let end = bound.get(3)?.end();
            Some(format!(
                "{}>={}{}",
                &text[..start],
                entry.replacement_version,
                &text[end..]
            ))
        })
}

impl DeclarationFormat for PyprojectTomlFormat {
    fn syntax(&self) -> DeclarationSyntax {
        DeclarationSyntax::PyprojectToml
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Declaration>, ManifestError> {
        toml::from_str::<toml::Table>(content)
            .map_err(|e| ManifestError::toml_parse_error(path, e.to_string()))?;

        let lines: Vec<&str> = lines_with_endings(content).map(|(_, body, _)| body).collect();
        let mut declarations = Vec::new();

        for segment in scan_dependency_arrays(content) {
            let body = lines[segment.line];
            for (_, text) in quoted_strings(body, &segment.range) {
                match parse_requirement(text) {
                    Ok(req) => declarations.push(Declaration::new(
                        req,
                        SourceLocation::new(path, segment.line),
                        self.syntax(),
                    )),
                    Err(e) => warn!(
                        "Failed to parse {} ({}:{}): {}",
                        text,
                        path.display(),
                        segment.line + 1,
                        e
                    ),
                }
            }
        }

        Ok(declarations)
    }

    fn rewrite(&self, content: &str, outdated: &[OutdatedEntry]) -> Rewrite {
        let keyed: Vec<(PackageName, &OutdatedEntry)> = outdated
            .iter()
            .filter_map(|entry| entry.key().map(|key| (key, entry)))
            .collect();

        let segments: HashMap<usize, Range<usize>> = scan_dependency_arrays(content)
            .into_iter()
            .map(|segment| (segment.line, segment.range))
            .collect();

        rewrite_lines(content, |index, body| {
            let range = segments.get(&index)?;

            let edits: Vec<(Range<usize>, String)> = quoted_strings(body, range)
                .filter_map(|(span, text)| {
                    rewrite_requirement(text, &keyed).map(|replacement| (span, replacement))
                })
                .collect();

            if edits.is_empty() {
                return None;
            }

            let mut line = body.to_string();
            for (span, replacement) in edits.into_iter().rev() {
                line.replace_range(span, &replacement);
            }
            Some(line)
        })
    }
}
