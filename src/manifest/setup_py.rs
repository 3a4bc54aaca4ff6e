//! setup.py scanner and rewriter
//!
//! Build scripts are not evaluated. Quoted requirement strings are picked out
//! line by line to learn which packages are named; versions are matched only
//! at rewrite time, against the literal old version.

use crate::domain::{Declaration, DeclarationSyntax, OutdatedEntry, SourceLocation};
use crate::error::ManifestError;
use crate::manifest::{lines_with_endings, rewrite_lines, DeclarationFormat, Rewrite};
use crate::parser::{same_version, ParsedRequirement};
use pep508_rs::PackageName;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Legacy build script format
pub struct SetupPyFormat;

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\\]*)"|'([^'\\]*)'"#).unwrap());

// Requirement-looking string: name, optional extras, operator, version digit
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)\s*(\[[^\]]*\])?\s*(?:===|[<>=!~]=?)\s*[0-9]")
        .unwrap()
});

// `name <op> version` anywhere on a line. Group 1 is the character before
// the name (or empty at line start), group 2 the name as written, group 3
// the version token.
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9._-])([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:===|[<>=!~]=?)\s*([0-9A-Za-z.+!_-]+)")
        .unwrap()
});

/// Replace every span on the line that pins an outdated version
fn rewrite_spans(line: &str, outdated: &[(PackageName, &OutdatedEntry)]) -> Option<String> {
    let mut matched = false;
    let rewritten = SPAN_RE.replace_all(line, |caps: &Captures| {
        let package = caps[2].parse::<PackageName>().ok();
        let entry = outdated.iter().find(|(key, entry)| {
            Some(key) == package.as_ref() && same_version(&caps[3], &entry.declared_version)
        });
        match entry {
            Some((_, entry)) => {
                matched = true;
                format!("{}{}>={}", &caps[1], &caps[2], entry.replacement_version)
            }
            None => caps[0].to_string(),
        }
    });

    matched.then(|| rewritten.into_owned())
}

impl DeclarationFormat for SetupPyFormat {
    fn syntax(&self) -> DeclarationSyntax {
        DeclarationSyntax::SetupPy
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Declaration>, ManifestError> {
        let mut declarations = Vec::new();

        for (index, body, _) in lines_with_endings(content) {
            if body.trim_start().starts_with('#') {
                continue;
            }

            for caps in QUOTED_RE.captures_iter(body) {
                let Some(text) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                let Some(name) = REQUIREMENT_RE.captures(text.as_str()).map(|c| c[1].to_string())
                else {
                    continue;
                };
                match name.parse::<PackageName>() {
                    Ok(package) => {
                        debug!("Found {} in {}:{}", name, path.display(), index + 1);
                        declarations.push(Declaration::new(
                            ParsedRequirement {
                                name,
                                package,
                                version: None,
                            },
                            SourceLocation::new(path, index),
                            self.syntax(),
                        ));
                    }
                    Err(e) => warn!("Skipping {} ({}:{}): {}", name, path.display(), index + 1, e),
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

        rewrite_lines(content, |_, body| {
            if body.trim_start().starts_with('#') {
                return None;
            }
            rewrite_spans(body, &keyed)
        })
    }
}
