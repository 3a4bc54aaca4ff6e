//! requirements.txt parser and rewriter
//!
//! Handles:
//! - One PEP 508 requirement per line
//! - Full-line and inline `#` comments
//! - pip option lines (`-r`, `-e`, `--index-url`), which are not requirements

use crate::domain::{Declaration, DeclarationSyntax, OutdatedEntry, SourceLocation};
use crate::error::ManifestError;
use crate::manifest::{lines_with_endings, rewrite_lines, DeclarationFormat, Rewrite};
use crate::parser::{parse_requirement, same_version};
use pep508_rs::PackageName;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

/// Plain-list requirements format
pub struct RequirementsTxtFormat;

static INLINE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+#.*$").unwrap());

// Rewritable line: a name, optionally followed by version specifiers
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*([<>=!~]=?.*)?$").unwrap()
});

/// Returns true for lines that never carry a requirement
fn is_passthrough(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-')
}

/// Replacement for one line, if it declares an outdated version
///
/// A line qualifies when it names the package and either has no `>=`/`==`
/// bound or is bound to the outdated version itself. A line already bound to
/// some other version is left alone.
fn rewrite_line(trimmed: &str, outdated: &[(PackageName, &OutdatedEntry)]) -> Option<String> {
    let written = LINE_RE.captures(trimmed)?.get(1)?.as_str();
    let package: PackageName = written.parse().ok()?;
    let bound = parse_requirement(&INLINE_COMMENT_RE.replace(trimmed, ""))
        .ok()
        .and_then(|requirement| requirement.version)
        .map(|version| version.to_string());

    outdated
        .iter()
        .filter(|(key, _)| *key == package)
        .find(|(_, entry)| match &bound {
            Some(bound) => same_version(bound, &entry.declared_version),
            None => true,
        })
        .map(|(_, entry)| format!("{}>={}", written, entry.replacement_version))
}

impl DeclarationFormat for RequirementsTxtFormat {
    fn syntax(&self) -> DeclarationSyntax {
        DeclarationSyntax::RequirementsTxt
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Declaration>, ManifestError> {
        let mut declarations = Vec::new();

        for (index, body, _) in lines_with_endings(content) {
            let trimmed = body.trim();
            if is_passthrough(trimmed) {
                continue;
            }

            let text = INLINE_COMMENT_RE.replace(trimmed, "");
            match parse_requirement(&text) {
                Ok(req) => declarations.push(Declaration::new(
                    req,
                    SourceLocation::new(path, index),
                    self.syntax(),
                )),
                Err(e) => warn!("Failed to parse {} ({}:{}): {}", trimmed, path.display(), index + 1, e),
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
            let trimmed = body.trim();
            if is_passthrough(trimmed) {
                return None;
            }
            rewrite_line(trimmed, &keyed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pep508_rs::pep440_rs::Version;
    use std::str::FromStr;

    fn entry(package: &str, old: &str, new: &str) -> OutdatedEntry {
        let released = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        OutdatedEntry::new(package, old, released, new)
    }

    fn parse(content: &str) -> Vec<Declaration> {
        RequirementsTxtFormat
            .parse(Path::new("requirements.txt"), content)
            .unwrap()
    }

    #[test]
    fn test_parse_versions_and_locations() {
        let deps = parse("foo>=1.0.0\n\n# pinned intentionally\nbar==2.0\nbaz<3\n");
        assert_eq!(deps.len(), 3);

        assert_eq!(deps[0].name, "foo");
        assert_eq!(deps[0].version, Some(Version::from_str("1.0.0").unwrap()));
        assert_eq!(deps[0].location.line, 0);

        assert_eq!(deps[1].name, "bar");
        assert_eq!(deps[1].location.line, 3);

        // Upper bound only: nothing to evaluate
        assert_eq!(deps[2].name, "baz");
        assert!(deps[2].version.is_none());
    }

    #[test]
    fn test_parse_skips_options_and_malformed_lines() {
        let deps = parse("-r base.txt\n--index-url https://example.org\n>=broken\nok>=1.0\n");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "ok");
    }

    #[test]
    fn test_parse_inline_comment() {
        let deps = parse("requests>=2.28.0  # http client\n");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].version, Some(Version::from_str("2.28.0").unwrap()));
    }

    #[test]
    fn test_rewrite_scenario() {
        let rewrite = RequirementsTxtFormat.rewrite("foo>=1.0.0\n", &[entry("foo", "1.0.0", "1.4.2")]);
        assert_eq!(rewrite.content, "foo>=1.4.2\n");
        assert_eq!(rewrite.changes.len(), 1);
        assert_eq!(rewrite.changes[0].old, "foo>=1.0.0");
        assert_eq!(rewrite.changes[0].new, "foo>=1.4.2");
    }

    #[test]
    fn test_rewrite_preserves_comments_and_blank_lines() {
        let content = "# pinned intentionally\nfoo==1.0.0\n\nbar>=3.0\n# trailing\n";
        let rewrite = RequirementsTxtFormat.rewrite(content, &[entry("foo", "1.0.0", "1.4.2")]);
        assert_eq!(
            rewrite.content,
            "# pinned intentionally\nfoo>=1.4.2\n\nbar>=3.0\n# trailing\n"
        );
        assert_eq!(rewrite.content.lines().count(), content.lines().count());
    }

    #[test]
    fn test_rewrite_does_not_touch_prefixed_names() {
        let content = "foo-bar>=1.0\nfoo>=1.0\n";
        let rewrite = RequirementsTxtFormat.rewrite(content, &[entry("foo", "1.0", "2.0")]);
        assert_eq!(rewrite.content, "foo-bar>=1.0\nfoo>=2.0\n");
    }

    #[test]
    fn test_rewrite_name_without_operator_and_case() {
        let content = "Foo\r\nother\r\n";
        let rewrite = RequirementsTxtFormat.rewrite(content, &[entry("foo", "1.0", "2.0")]);
        assert_eq!(rewrite.content, "Foo>=2.0\r\nother\r\n");
    }

    #[test]
    fn test_rewrite_keeps_spelling_of_the_line() {
        let content = "Flask_SQLAlchemy==2.5.1  # orm\n";
        let rewrite =
            RequirementsTxtFormat.rewrite(content, &[entry("flask-sqlalchemy", "2.5.1", "3.0.0")]);
        assert_eq!(rewrite.content, "Flask_SQLAlchemy>=3.0.0\n");
    }

    #[test]
    fn test_rewrite_leaves_newer_bound_alone() {
        // The outdated entry came from another file declaring foo>=1.0.0
        let content = "foo>=1.6.0\nfoo==1.0.0\n";
        let rewrite = RequirementsTxtFormat.rewrite(content, &[entry("foo", "1.0.0", "1.4.2")]);
        assert_eq!(rewrite.content, "foo>=1.6.0\nfoo>=1.4.2\n");
        assert_eq!(rewrite.changes.len(), 1);
        assert_eq!(rewrite.changes[0].line, 1);
    }

    #[test]
    fn test_rewrite_matches_equivalent_version_spelling() {
        let rewrite = RequirementsTxtFormat.rewrite("foo>=1.0\n", &[entry("foo", "1.0.0", "1.4.2")]);
        assert_eq!(rewrite.content, "foo>=1.4.2\n");
    }

    #[test]
    fn test_rewrite_ignores_option_lines() {
        let content = "-e foo\n--find-links foo\n";
        let rewrite = RequirementsTxtFormat.rewrite(content, &[entry("foo", "1.0", "2.0")]);
        assert!(!rewrite.has_changes());
    }

    #[test]
    fn test_rewrite_first_match_wins() {
        let rewrite = RequirementsTxtFormat.rewrite(
            "foo>=1.0\n",
            &[entry("foo", "1.0", "2.0"), entry("foo", "1.0", "3.0")],
        );
        assert_eq!(rewrite.content, "foo>=2.0\n");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let outdated = [entry("foo", "1.0.0", "1.4.2"), entry("bar", "2.0", "2.5.0")];
        let first = RequirementsTxtFormat.rewrite("foo>=1.0.0\nbar==2.0\nbaz\n", &outdated);
        let second = RequirementsTxtFormat.rewrite(&first.content, &outdated);
        assert_eq!(second.content, first.content);
        assert!(!second.has_changes());
    }

    #[test]
    fn test_rewrite_keeps_missing_final_newline() {
        let rewrite = RequirementsTxtFormat.rewrite("foo>=1.0", &[entry("foo", "1.0", "2.0")]);
        assert_eq!(rewrite.content, "foo>=2.0");
    }
}
