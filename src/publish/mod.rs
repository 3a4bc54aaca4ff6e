//! Publishing rewritten declaration files as a change request
//!
//! This module provides:
//! - The ChangePublisher capability trait
//! - A no-op publisher used for dry runs and when credentials are absent
//! - A GitHub publisher driving git and the pull request API

mod git;
mod github;

pub use git::{GitRunner, SystemGit};
pub use github::{GitHubPublisher, GITHUB_API_URL, PULL_REQUEST_BODY};

use crate::error::PublishError;
use crate::registry::HttpClient;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Commit message and pull request title
pub const COMMIT_MESSAGE: &str = "Update outdated dependencies (SPEC-0)";

/// What to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Branch to create
    pub branch: String,
    /// Commit message, also used as the pull request title
    pub message: String,
    /// Files to commit
    pub files: Vec<PathBuf>,
}

impl PublishRequest {
    /// Create a request on a fresh branch with the default message
    ///
    /// git runs inside `root`, so each file is recorded relative to it.
    pub fn new(root: &Path, files: Vec<PathBuf>) -> Self {
        let files = files
            .into_iter()
            .map(|file| match file.strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => file,
            })
            .collect();
        Self {
            branch: branch_name(),
            message: COMMIT_MESSAGE.to_string(),
            files,
        }
    }
}

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// A pull request was opened
    Opened { url: String, branch: String },
    /// Publishing was not attempted
    Skipped { reason: String },
}

/// Capability to publish a set of changed files
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    /// Commit the files and open a change request
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError>;
}

/// Publisher that never touches git or the network
#[derive(Debug, Clone)]
pub struct NoopPublisher {
    reason: String,
}

impl NoopPublisher {
    /// Create a no-op publisher that reports the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason publishing is skipped
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl ChangePublisher for NoopPublisher {
    async fn publish(&self, _request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        info!("Skipping git and pull request creation: {}", self.reason);
        Ok(PublishOutcome::Skipped {
            reason: self.reason.clone(),
        })
    }
}

/// Settings that decide which publisher to use
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Dry-run mode disables publishing
    pub dry_run: bool,
    /// GitHub token
    pub token: Option<String>,
    /// `owner/repo`
    pub repository: Option<String>,
    /// GitHub API root
    pub api_url: String,
    /// Base branch for the pull request
    pub base: String,
    /// Repository working directory
    pub working_dir: PathBuf,
}

/// Pick the publisher for a run
pub fn select_publisher(settings: &PublishSettings, client: HttpClient) -> Box<dyn ChangePublisher> {
    if settings.dry_run {
        return Box::new(NoopPublisher::new("dry run"));
    }

    let token = settings.token.as_deref().filter(|t| !t.is_empty());
    let repository = settings.repository.as_deref().filter(|r| !r.is_empty());

    match (token, repository) {
        (Some(token), Some(repository)) => Box::new(
            GitHubPublisher::new(
                Box::new(SystemGit::new(&settings.working_dir)),
                client,
                repository,
                token,
            )
            .with_api_url(&settings.api_url)
            .with_base(&settings.base),
        ),
        _ => Box::new(NoopPublisher::new("missing GITHUB_TOKEN or GITHUB_REPOSITORY")),
    }
}

/// Fresh branch name: `spec0-update-` plus 6 random hex characters
pub fn branch_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("spec0-update-{}", &id[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dry_run: bool, token: Option<&str>, repository: Option<&str>) -> PublishSettings {
        PublishSettings {
            dry_run,
            token: token.map(String::from),
            repository: repository.map(String::from),
            api_url: GITHUB_API_URL.to_string(),
            base: "main".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    fn request() -> PublishRequest {
        PublishRequest::new(Path::new("."), vec![PathBuf::from("./requirements.txt")])
    }

    async fn outcome(settings: &PublishSettings) -> PublishOutcome {
        select_publisher(settings, HttpClient::new().unwrap())
            .publish(&request())
            .await
            .unwrap()
    }

    #[test]
    fn test_branch_name_format() {
        let name = branch_name();
        let suffix = name.strip_prefix("spec0-update-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_publish_request_defaults() {
        let request = request();
        assert_eq!(request.message, COMMIT_MESSAGE);
        assert!(request.branch.starts_with("spec0-update-"));
        assert_eq!(request.files, vec![PathBuf::from("requirements.txt")]);
    }

    #[test]
    fn test_publish_request_files_relative_to_root() {
        let request = PublishRequest::new(
            Path::new("myproj"),
            vec![
                PathBuf::from("myproj/requirements.txt"),
                PathBuf::from("myproj/sub/pyproject.toml"),
                PathBuf::from("elsewhere/setup.py"),
            ],
        );
        assert_eq!(
            request.files,
            vec![
                PathBuf::from("requirements.txt"),
                PathBuf::from("sub/pyproject.toml"),
                PathBuf::from("elsewhere/setup.py"),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_selects_noop() {
        let outcome = outcome(&settings(true, Some("t"), Some("o/r"))).await;
        assert_eq!(
            outcome,
            PublishOutcome::Skipped {
                reason: "dry run".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_selects_noop() {
        for s in [
            settings(false, None, Some("o/r")),
            settings(false, Some("t"), None),
            settings(false, Some(""), Some("o/r")),
        ] {
            assert!(matches!(outcome(&s).await, PublishOutcome::Skipped { .. }));
        }
    }

    #[tokio::test]
    async fn test_noop_publisher() {
        let publisher = NoopPublisher::new("testing");
        assert_eq!(publisher.reason(), "testing");
        let outcome = publisher.publish(&request()).await.unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Skipped {
                reason: "testing".to_string()
            }
        );
    }
}
