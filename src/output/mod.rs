//! Output formatting for run reports
//!
//! This module provides:
//! - Text output for console display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::cli::CliArgs;
use crate::orchestrator::RunReport;
use std::io::Write;

/// How the report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How much of the report the text format shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Outdated packages, rewritten lines and the publish result
    Quiet,
    /// Adds the header and skipped lookups
    #[default]
    Normal,
    /// Also lists compliant packages and declarations without a version
    Verbose,
}

/// Rendering choices derived from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// ANSI colors, only when stdout is a terminal
    pub color: bool,
}

impl OutputConfig {
    /// `--quiet` wins over `--verbose`; `--json` ignores both
    pub fn for_args(args: &CliArgs, color: bool) -> Self {
        let verbosity = match (args.quiet, args.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };

        Self {
            format: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            verbosity,
            color: color && !args.json,
        }
    }
}

/// Renders a finished run
pub trait OutputFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()>;
}

pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(argv: &[&str], color: bool) -> OutputConfig {
        let mut full = vec!["spec0-bot"];
        full.extend_from_slice(argv);
        OutputConfig::for_args(&CliArgs::parse_from(full), color)
    }

    #[test]
    fn test_plain_run_is_normal_text() {
        assert_eq!(
            config(&[], true),
            OutputConfig {
                format: OutputFormat::Text,
                verbosity: Verbosity::Normal,
                color: true,
            }
        );
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(config(&["--verbose"], false).verbosity, Verbosity::Verbose);
        assert_eq!(config(&["--verbose", "-q"], false).verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_json_never_colored() {
        let json = config(&["--json"], true);
        assert_eq!(json.format, OutputFormat::Json);
        assert!(!json.color);
    }
}
