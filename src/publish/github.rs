//! GitHub pull request publisher
//!
//! Commits the rewritten files on a fresh branch, pushes it and opens a pull
//! request through the REST API.
//! API endpoint: POST {api}/repos/{owner}/{repo}/pulls

use crate::error::PublishError;
use crate::publish::{ChangePublisher, GitRunner, PublishOutcome, PublishRequest};
use crate::registry::HttpClient;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

/// GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Body of every pull request opened by the bot
pub const PULL_REQUEST_BODY: &str = "Automatically opened by SPEC-0 compliance bot.";

const BOT_EMAIL: &str = "spec0-bot@users.noreply.github.com";
const BOT_NAME: &str = "spec0-bot";

/// Pull request creation payload
#[derive(Debug, Serialize)]
struct NewPullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

/// Subset of the pull request response
#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

/// Publisher that pushes a branch and opens a GitHub pull request
pub struct GitHubPublisher {
    git: Box<dyn GitRunner>,
    client: HttpClient,
    api_url: String,
    repository: String,
    token: String,
    base: String,
}

impl GitHubPublisher {
    /// Create a new publisher for `owner/repo`
    pub fn new(
        git: Box<dyn GitRunner>,
        client: HttpClient,
        repository: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            git,
            client,
            api_url: GITHUB_API_URL.to_string(),
            repository: repository.into(),
            token: token.into(),
            base: "main".to_string(),
        }
    }

    /// Use a different API root (GitHub Enterprise or a test server)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Target branch of the pull request
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn pulls_url(&self) -> String {
        format!("{}/repos/{}/pulls", self.api_url, self.repository)
    }

    /// Commit the changed files on a new branch and push it
    fn push_branch(&self, request: &PublishRequest) -> Result<(), PublishError> {
        self.git.run(&["config", "user.email", BOT_EMAIL])?;
        self.git.run(&["config", "user.name", BOT_NAME])?;
        self.git.run(&["checkout", "-b", request.branch.as_str()])?;

        let files: Vec<String> = request
            .files
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        let mut add = vec!["add", "--"];
        add.extend(files.iter().map(String::as_str));
        self.git.run(&add)?;

        self.git.run(&["commit", "-m", request.message.as_str()])?;
        self.git.run(&["push", "origin", request.branch.as_str()])?;
        Ok(())
    }

    async fn open_pull_request(&self, request: &PublishRequest) -> Result<String, PublishError> {
        let payload = NewPullRequest {
            title: &request.message,
            body: PULL_REQUEST_BODY,
            head: &request.branch,
            base: &self.base,
        };

        let response = self
            .client
            .inner()
            .post(self.pulls_url())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| PublishError::host_api("GitHub", e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::host_api(
                "GitHub",
                format!("HTTP {}: {}", status, detail.trim()),
            ));
        }

        let created: PullRequestResponse = response
            .json()
            .await
            .map_err(|e| PublishError::host_api("GitHub", format!("failed to parse JSON: {}", e)))?;

        Ok(created.html_url)
    }
}

#[async_trait]
impl ChangePublisher for GitHubPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        self.push_branch(request)?;
        info!("Pushed branch {}", request.branch);

        let url = self.open_pull_request(request).await?;
        info!("Pull request created: {}", url);

        Ok(PublishOutcome::Opened {
            url,
            branch: request.branch.clone(),
        })
    }
}
