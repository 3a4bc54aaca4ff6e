//! Text output formatter for console display
//!
//! This module provides:
//! - The outdated package lines with release date and replacement
//! - The rewritten lines per file
//! - The pull request result or the reason publishing was skipped

use crate::domain::{Evaluation, OutdatedEntry, UnresolvedReason};
use crate::manifest::{LineChange, RewriteResult};
use crate::orchestrator::RunReport;
use crate::output::{OutputFormatter, Verbosity};
use crate::publish::PublishOutcome;
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn format_outdated(&self, entry: &OutdatedEntry, writer: &mut dyn Write) -> std::io::Result<()> {
        if !self.color {
            return writeln!(writer, "{}", entry);
        }
        writeln!(
            writer,
            "{} >= {} {}, oldest compliant: {}",
            entry.package.bold(),
            entry.declared_version.red(),
            format!("(released {})", entry.declared_published_at.date()).dimmed(),
            entry.replacement_version.green().bold()
        )
    }

    fn format_other(&self, evaluation: &Evaluation, writer: &mut dyn Write) -> std::io::Result<()> {
        let line = match evaluation {
            Evaluation::Compliant {
                package,
                version,
                published_at,
            } if self.verbosity == Verbosity::Verbose => format!(
                "{} >= {} (released {}) is within the window",
                package,
                version,
                published_at.date()
            ),
            Evaluation::Unresolved {
                package,
                version,
                reason,
            } => {
                if *reason == UnresolvedReason::NoVersion && self.verbosity != Verbosity::Verbose {
                    return Ok(());
                }
                match version {
                    Some(version) => format!("{} >= {}: skipped ({})", package, version, reason),
                    None => format!("{}: skipped ({})", package, reason),
                }
            }
            _ => return Ok(()),
        };

        if self.color {
            writeln!(writer, "{}", line.dimmed())
        } else {
            writeln!(writer, "{}", line)
        }
    }

    fn format_change(
        &self,
        rewrite: &RewriteResult,
        change: &LineChange,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let file = rewrite.syntax.file_name();
        let old = change.old.trim();
        let new = change.new.trim();

        if self.color {
            writeln!(writer, "{}: {} {} {}", file.bold(), old, "→".dimmed(), new.green())
        } else {
            writeln!(writer, "{}: {} → {}", file, old, new)
        }
    }

    fn format_publish(&self, outcome: &PublishOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
        match outcome {
            PublishOutcome::Opened { url, .. } if self.color => {
                writeln!(writer, "Pull request created: {}", url.green().bold())
            }
            PublishOutcome::Opened { url, .. } => writeln!(writer, "Pull request created: {}", url),
            PublishOutcome::Skipped { reason } => {
                writeln!(writer, "Skipping git and pull request creation: {}", reason)
            }
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let quiet = self.verbosity == Verbosity::Quiet;

        if !quiet {
            writeln!(writer, "Checking for SPEC-0 violations...")?;
            writeln!(writer)?;
        }

        if report.no_declaration_files() {
            if !quiet {
                writeln!(writer, "No requirements.txt, pyproject.toml or setup.py found.")?;
            }
            return Ok(());
        }

        for evaluation in &report.evaluations {
            match evaluation.outdated() {
                Some(entry) => self.format_outdated(entry, writer)?,
                None if !quiet => self.format_other(evaluation, writer)?,
                None => {}
            }
        }

        if !report.has_outdated() {
            if !quiet {
                writeln!(writer, "All dependencies are within the SPEC-0 window.")?;
            }
            return Ok(());
        }

        if !quiet {
            writeln!(writer)?;
            if report.dry_run {
                writeln!(writer, "Updating... (dry run, files are left unchanged)")?;
            } else {
                writeln!(writer, "Updating...")?;
            }
            writeln!(writer)?;
        }

        for rewrite in report.changed_files() {
            for change in &rewrite.changes {
                self.format_change(rewrite, change, writer)?;
            }
        }

        if let Some(outcome) = &report.publish {
            if !quiet {
                writeln!(writer)?;
            }
            self.format_publish(outcome, writer)?;
        }

        Ok(())
    }
}
