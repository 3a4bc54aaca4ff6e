//! JSON output formatter for machine processing

use crate::domain::{DeclarationSyntax, Evaluation};
use crate::manifest::RewriteResult;
use crate::orchestrator::RunReport;
use crate::output::OutputFormatter;
use crate::publish::PublishOutcome;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    dry_run: bool,
    window_years: f64,
    files: Vec<JsonFile>,
    summary: JsonSummary,
    evaluations: &'a [Evaluation],
    rewrites: &'a [RewriteResult],
    publish: Option<&'a PublishOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Serialize)]
struct JsonFile {
    path: String,
    syntax: DeclarationSyntax,
}

#[derive(Serialize)]
struct JsonSummary {
    compliant: usize,
    outdated: usize,
    unresolved: usize,
    changed_lines: usize,
}

impl JsonSummary {
    fn from_report(report: &RunReport) -> Self {
        let outdated = report.outdated().count();
        let compliant = report
            .evaluations
            .iter()
            .filter(|e| e.is_compliant())
            .count();
        Self {
            compliant,
            outdated,
            unresolved: report.evaluations.len() - compliant - outdated,
            changed_lines: report.rewrites.iter().map(|r| r.changes.len()).sum(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: report.dry_run,
            window_years: report.window_years,
            files: report
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.path.display().to_string(),
                    syntax: f.syntax,
                })
                .collect(),
            summary: JsonSummary::from_report(report),
            evaluations: &report.evaluations,
            rewrites: &report.rewrites,
            publish: report.publish.as_ref(),
            errors: report.errors.iter().map(|e| e.to_string()).collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
