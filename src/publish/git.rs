//! Git command execution for publishing
//!
//! This module provides:
//! - The GitRunner trait so publishing can be exercised without a repository
//! - SystemGit, which runs the real `git` binary

use crate::error::PublishError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Trait for running git subcommands
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` and return its standard output
    fn run(&self, args: &[&str]) -> Result<String, PublishError>;
}

/// Git runner that executes real commands in a working directory
#[derive(Debug, Clone)]
pub struct SystemGit {
    working_dir: PathBuf,
}

impl SystemGit {
    /// Create a runner for the given working directory
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// The directory commands run in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn run_command(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let command = args.first().copied().unwrap_or_default();
        debug!("Running git {}", args.join(" "));

        let output = self
            .run_command(args)
            .map_err(|e| PublishError::git_failed(command, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            };
            return Err(PublishError::git_failed(command, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
