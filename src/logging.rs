//! Diagnostic logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout carries the report.
//! `RUST_LOG` overrides the level chosen from the CLI flags.

use tracing_subscriber::EnvFilter;

/// Default filter for the given verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "spec0_bot=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
