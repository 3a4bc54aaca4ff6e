//! Run orchestrator coordinating the whole compliance pass
//!
//! This module provides:
//! - Workflow coordination: detect → parse → evaluate → rewrite → publish
//! - Sequential index lookups, one query per distinct package
//! - Dry-run mode support
//! - Error handling with partial continuation

use crate::cli::CliArgs;
use crate::compliance::ComplianceEvaluator;
use crate::domain::{Declaration, Evaluation, OutdatedEntry};
use crate::error::AppError;
use crate::manifest::{
    detect_declaration_files, read_declarations, DeclarationFile, DeclarationWriter,
    RewriteResult,
};
use crate::progress::Progress;
use crate::publish::{select_publisher, ChangePublisher, PublishOutcome, PublishRequest};
use crate::registry::{HttpClient, PackageIndex, PyPIIndex};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Orchestrator for one run
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    index: Box<dyn PackageIndex>,
    publisher: Box<dyn ChangePublisher>,
    /// Fixed clock for tests
    now: Option<NaiveDateTime>,
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunReport {
    /// Whether files were left untouched on disk
    pub dry_run: bool,
    /// Window length in years
    pub window_years: f64,
    /// Declaration files found
    pub files: Vec<DeclarationFile>,
    /// One evaluation per distinct (package, version)
    pub evaluations: Vec<Evaluation>,
    /// Rewrite results for files that declare an outdated package
    pub rewrites: Vec<RewriteResult>,
    /// Publish outcome, when anything was rewritten
    pub publish: Option<PublishOutcome>,
    /// Errors encountered during processing
    pub errors: Vec<OrchestratorError>,
}

impl RunReport {
    fn new(args: &CliArgs) -> Self {
        Self {
            dry_run: args.dry_run,
            window_years: args.window.years(),
            files: Vec::new(),
            evaluations: Vec::new(),
            rewrites: Vec::new(),
            publish: None,
            errors: Vec::new(),
        }
    }

    /// Returns true if no declaration file exists in the target directory
    pub fn no_declaration_files(&self) -> bool {
        self.files.is_empty()
    }

    /// Outdated packages with their replacements
    pub fn outdated(&self) -> impl Iterator<Item = &OutdatedEntry> {
        self.evaluations.iter().filter_map(Evaluation::outdated)
    }

    /// Returns true if any declared version is outdated
    pub fn has_outdated(&self) -> bool {
        self.outdated().next().is_some()
    }

    /// Rewrites that changed at least one line
    pub fn changed_files(&self) -> impl Iterator<Item = &RewriteResult> {
        self.rewrites.iter().filter(|r| r.has_changes())
    }
}

/// Errors that can occur during orchestration
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Failed to read or parse a declaration file
    #[error("Failed to parse {path}: {message}")]
    ManifestParseError { path: String, message: String },

    /// Failed to rewrite a declaration file
    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    /// Failed to publish the change
    #[error("Failed to publish: {0}")]
    PublishError(String),
}

impl Orchestrator {
    /// Create a new orchestrator talking to the configured index and host
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        let index = PyPIIndex::with_base_url(client.clone(), &args.index_url);
        let publisher = select_publisher(&args.publish_settings(), client);

        Ok(Self::with_parts(args, Box::new(index), publisher))
    }

    /// Create an orchestrator from explicit parts (for testing)
    pub fn with_parts(
        args: CliArgs,
        index: Box<dyn PackageIndex>,
        publisher: Box<dyn ChangePublisher>,
    ) -> Self {
        Self {
            args,
            index,
            publisher,
            now: None,
        }
    }

    /// Evaluate against a fixed current time (for testing)
    pub fn with_time(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Run the workflow
    pub async fn run(&self) -> RunReport {
        self.run_with_progress(!self.args.quiet && !self.args.json)
            .await
    }

    /// Run the workflow with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> RunReport {
        let mut report = RunReport::new(&self.args);

        // Step 1: Detect declaration files
        let files = detect_declaration_files(&self.args.path);
        if files.is_empty() {
            info!("No declaration files found in {}", self.args.path.display());
            return report;
        }
        report.files = files;

        // Step 2: Parse declarations
        let mut parsed_files = Vec::new();
        let mut declarations = Vec::new();
        for file in &report.files {
            match read_declarations(file) {
                Ok(found) => {
                    debug!("{}: {} declarations", file.path.display(), found.len());
                    declarations.extend(found);
                    parsed_files.push(file.clone());
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file.path.display(), e);
                    report.errors.push(OrchestratorError::ManifestParseError {
                        path: file.path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // Step 3: Evaluate each distinct (package, version)
        let candidates = distinct(declarations);
        report.evaluations = self.evaluate_all(&candidates, show_progress).await;

        let outdated: Vec<OutdatedEntry> = report.outdated().cloned().collect();
        if outdated.is_empty() {
            return report;
        }

        // Step 4: Rewrite declaration files
        let writer = DeclarationWriter::new(self.args.dry_run);
        report.rewrites = writer.apply_all(&parsed_files, &outdated);

        for result in &report.rewrites {
            for error in &result.errors {
                report.errors.push(OrchestratorError::WriteError {
                    path: result.path.display().to_string(),
                    message: error.clone(),
                });
            }
        }

        // Step 5: Publish
        let changed: Vec<_> = report.changed_files().map(|r| r.path.clone()).collect();
        if changed.is_empty() {
            return report;
        }

        let request = PublishRequest::new(&self.args.path, changed);
        match self.publisher.publish(&request).await {
            Ok(outcome) => report.publish = Some(outcome),
            Err(e) => {
                warn!("Publishing failed: {}", e);
                report.errors.push(OrchestratorError::PublishError(e.to_string()));
            }
        }

        report
    }

    async fn evaluate_all(&self, candidates: &[Declaration], show_progress: bool) -> Vec<Evaluation> {
        let mut evaluator = match self.now {
            Some(now) => ComplianceEvaluator::with_time(self.index.as_ref(), self.args.window, now),
            None => ComplianceEvaluator::new(self.index.as_ref(), self.args.window),
        };

        let lookups = candidates.iter().filter(|d| d.version.is_some()).count();
        let progress = Progress::lookups(show_progress, lookups);

        let mut evaluations = Vec::with_capacity(candidates.len());
        for declaration in candidates {
            let counted = declaration.version.is_some();
            if counted {
                progress.checking(&declaration.name);
            }
            evaluations.push(evaluator.evaluate(declaration).await);
            if counted {
                progress.done();
            }
        }

        progress.finish();
        evaluations
    }
}

/// Keep the first declaration of each (package, version) pair
fn distinct(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let mut seen = HashSet::new();
    declarations
        .into_iter()
        .filter(|d| seen.insert((d.key().clone(), d.version_string())))
        .collect()
}
