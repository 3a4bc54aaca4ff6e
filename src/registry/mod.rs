//! Package index adapters for fetching release history
//!
//! This module provides:
//! - HTTP client shared foundation
//! - PyPI JSON API adapter

mod client;
mod pypi;

pub use client::HttpClient;
pub use pypi::{parse_upload_time, PyPIIndex, PYPI_API_URL};

use crate::domain::ReleaseHistory;
use crate::error::RegistryError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use pep508_rs::pep440_rs::Version;
use tracing::warn;

/// Trait for package index adapters
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Get the index name
    fn registry_name(&self) -> &'static str;

    /// Fetch every published version with its first publication time
    async fn fetch_release_history(&self, package: &str) -> Result<ReleaseHistory, RegistryError>;

    /// Fetch the publication time of one version; failures read as absent
    async fn fetch_publication_time(
        &self,
        package: &str,
        version: &Version,
    ) -> Option<NaiveDateTime> {
        match self.fetch_release_history(package).await {
            Ok(history) => history.publication_time(version),
            Err(e) => {
                warn!("Failed to get release date for {}=={}: {}", package, version, e);
                None
            }
        }
    }
}
