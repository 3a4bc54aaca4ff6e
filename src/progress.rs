//! Progress display while packages are checked against the index
//!
//! Drawn on stderr by indicatif and hidden automatically when stderr is not a
//! terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}";

/// Lookup counter shown during evaluation
///
/// Holds no bar at all when disabled (quiet and JSON runs) or when there is
/// nothing to look up, so every method is a no-op in those cases.
#[derive(Default)]
pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Progress over `lookups` index queries
    pub fn lookups(enabled: bool, lookups: usize) -> Self {
        if !enabled || lookups == 0 {
            return Self::default();
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");

        let bar = ProgressBar::new(lookups as u64).with_style(style);
        bar.set_message("Checking packages");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn checking(&self, package: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Checking {}", package));
        }
    }

    pub fn done(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Clear the bar so the report starts on a clean line
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}
