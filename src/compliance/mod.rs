//! Compliance evaluation for declared dependencies
//!
//! This module provides:
//! - The evaluator that classifies a declaration against the support window
//! - Oldest-compliant version selection from a release history

use crate::domain::{
    compare_versions, Declaration, Evaluation, OutdatedEntry, ReleaseHistory, ReleaseRecord,
    SupportWindow, UnresolvedReason,
};
use crate::registry::PackageIndex;
use chrono::{Local, NaiveDateTime};
use pep508_rs::PackageName;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Decides whether declared versions are outdated
///
/// Release histories are fetched at most once per package and kept for the
/// lifetime of the evaluator, which is a single run.
pub struct ComplianceEvaluator<'a> {
    index: &'a dyn PackageIndex,
    window: SupportWindow,
    /// Current time for age calculations
    now: NaiveDateTime,
    histories: HashMap<PackageName, Result<ReleaseHistory, String>>,
}

impl<'a> ComplianceEvaluator<'a> {
    /// Create a new evaluator using the local clock
    pub fn new(index: &'a dyn PackageIndex, window: SupportWindow) -> Self {
        Self::with_time(index, window, Local::now().naive_local())
    }

    /// Create a new evaluator with a custom current time (for testing)
    pub fn with_time(index: &'a dyn PackageIndex, window: SupportWindow, now: NaiveDateTime) -> Self {
        Self {
            index,
            window,
            now,
            histories: HashMap::new(),
        }
    }

    /// The window this evaluator checks against
    pub fn window(&self) -> SupportWindow {
        self.window
    }

    async fn history(&mut self, declaration: &Declaration) -> Result<&ReleaseHistory, String> {
        let key = declaration.key();
        if !self.histories.contains_key(key) {
            let fetched = self
                .index
                .fetch_release_history(&declaration.name)
                .await
                .map_err(|e| e.to_string());
            self.histories.insert(key.clone(), fetched);
        }

        match self.histories.get(key) {
            Some(Ok(history)) => Ok(history),
            Some(Err(message)) => Err(message.clone()),
            None => Err(format!("no release history for {}", declaration.name)),
        }
    }

    /// Classify one declaration
    pub async fn evaluate(&mut self, declaration: &Declaration) -> Evaluation {
        let Some(version) = declaration.version.clone() else {
            debug!("Skipping {}: no version bound", declaration.name);
            return Evaluation::unresolved(&declaration.name, None, UnresolvedReason::NoVersion);
        };
        let version_string = version.to_string();
        let window = self.window;
        let now = self.now;

        let history = match self.history(declaration).await {
            Ok(history) => history,
            Err(message) => {
                warn!("Failed to fetch release history for {}: {}", declaration.name, message);
                return Evaluation::unresolved(
                    &declaration.name,
                    Some(version_string),
                    UnresolvedReason::LookupFailed(message),
                );
            }
        };

        let Some(published_at) = history.publication_time(&version) else {
            warn!(
                "Could not determine release date for {}=={}",
                declaration.name, version_string
            );
            return Evaluation::unresolved(
                &declaration.name,
                Some(version_string),
                UnresolvedReason::UnknownVersion,
            );
        };

        if !window.is_outdated(published_at, now) {
            debug!(
                "{}=={} is {:.2} years old, within window",
                declaration.name,
                version_string,
                SupportWindow::age_in_years(published_at, now)
            );
            return Evaluation::Compliant {
                package: declaration.name.clone(),
                version: version_string,
                published_at,
            };
        }

        match oldest_compliant(history, window, now) {
            Some(replacement) => Evaluation::Outdated(OutdatedEntry::new(
                &declaration.name,
                version_string,
                published_at,
                replacement.version,
            )),
            None => {
                warn!("No compliant version found for {}", declaration.name);
                Evaluation::unresolved(
                    &declaration.name,
                    Some(version_string),
                    UnresolvedReason::NoCompliantVersion,
                )
            }
        }
    }
}

/// The earliest-published release inside the window
///
/// Releases published at the same instant resolve to the lower version.
pub fn oldest_compliant(
    history: &ReleaseHistory,
    window: SupportWindow,
    now: NaiveDateTime,
) -> Option<ReleaseRecord> {
    history
        .records()
        .filter(|record| window.contains(record.published_at, now))
        .min_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| compare_versions(&a.version, &b.version))
        })
}
