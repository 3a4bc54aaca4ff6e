//! CLI argument parsing module for spec0-bot
//!
//! Every option can also be supplied through the environment, which is how the
//! bot is usually configured when it runs as a CI job.

use crate::domain::SupportWindow;
use crate::publish::{PublishSettings, GITHUB_API_URL};
use crate::registry::PYPI_API_URL;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a boolean setting; only `true` (any case) means true
pub fn parse_env_bool(s: &str) -> Result<bool, String> {
    Ok(s.trim().eq_ignore_ascii_case("true"))
}

/// Parse the support window length in years
fn parse_window(s: &str) -> Result<SupportWindow, String> {
    let years: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of years: {}", s))?;
    SupportWindow::new(years).map_err(|e| e.to_string())
}

/// SPEC-0 dependency freshness bot for Python projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "spec0-bot",
    version,
    about = "Bump Python dependency minimums that fall outside the SPEC-0 support window"
)]
pub struct CliArgs {
    /// Project directory containing requirements.txt, pyproject.toml or setup.py
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Compute and report changes without writing files or opening a pull request
    #[arg(
        long,
        env = "SPEC0_DRY_RUN",
        default_value = "true",
        default_missing_value = "true",
        num_args = 0..=1,
        require_equals = true,
        action = ArgAction::Set,
        value_parser = parse_env_bool
    )]
    pub dry_run: bool,

    /// Support window in years
    #[arg(
        long = "window-years",
        env = "SPEC0_WINDOW_YEARS",
        default_value = "2",
        value_parser = parse_window
    )]
    pub window: SupportWindow,

    /// Package index JSON API root
    #[arg(long, env = "SPEC0_INDEX_URL", default_value = PYPI_API_URL)]
    pub index_url: String,

    /// Base branch for the pull request
    #[arg(long, env = "SPEC0_BASE_BRANCH", default_value = "main")]
    pub base: String,

    /// GitHub token used to open the pull request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub repository as owner/repo
    #[arg(long = "repository", env = "GITHUB_REPOSITORY")]
    pub github_repository: Option<String>,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    pub github_api_url: String,

    // Output options
    /// Output the run report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Settings for choosing and configuring the publisher
    pub fn publish_settings(&self) -> PublishSettings {
        PublishSettings {
            dry_run: self.dry_run,
            token: self.github_token.clone(),
            repository: self.github_repository.clone(),
            api_url: self.github_api_url.clone(),
            base: self.base.clone(),
            working_dir: self.path.clone(),
        }
    }
}
