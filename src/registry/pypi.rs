//! PyPI JSON API adapter
//!
//! Fetches a package's release history from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json

use crate::domain::ReleaseHistory;
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageIndex};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// PyPI API base URL
pub const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIIndex {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release information keyed by version
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    /// Upload time for the release file
    upload_time_iso_8601: Option<String>,
}

impl PyPIIndex {
    /// Create a new PyPI adapter against pypi.org
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_API_URL)
    }

    /// Create a PyPI adapter against a mirror or test server
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, package)
    }
}

/// Parse an `upload_time_iso_8601` value
///
/// The trailing `Z` is dropped and the remainder read as a naive timestamp.
pub fn parse_upload_time(value: &str) -> Option<NaiveDateTime> {
    value.trim_end_matches('Z').parse::<NaiveDateTime>().ok()
}

#[async_trait]
impl PackageIndex for PyPIIndex {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_release_history(&self, package: &str) -> Result<ReleaseHistory, RegistryError> {
        let url = self.build_url(package);
        debug!("Fetching PyPI package: {}", url);

        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let mut history = ReleaseHistory::new(package);

        for (version, files) in response.releases {
            // Versions without files are treated as unpublished
            let earliest = files
                .iter()
                .filter_map(|file| file.upload_time_iso_8601.as_deref())
                .filter_map(parse_upload_time)
                .min();

            if let Some(published_at) = earliest {
                history.insert(version, published_at);
            }
        }

        debug!(
            "Found {} published versions for package {}",
            history.len(),
            package
        );

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pep508_rs::pep440_rs::Version;
    use std::str::FromStr;

    fn index(base_url: &str) -> PyPIIndex {
        PyPIIndex::with_base_url(HttpClient::new().unwrap(), base_url)
    }

    #[test]
    fn test_pypi_registry_name() {
        assert_eq!(index(PYPI_API_URL).registry_name(), "PyPI");
    }

    #[test]
    fn test_build_url() {
        let pypi = PyPIIndex::new(HttpClient::new().unwrap());
        assert_eq!(
            pypi.build_url("requests"),
            "https://pypi.org/pypi/requests/json"
        );
    }

    #[test]
    fn test_build_url_trims_trailing_slash() {
        assert_eq!(
            index("http://localhost:1234/pypi/").build_url("flask-restful"),
            "http://localhost:1234/pypi/flask-restful/json"
        );
    }

    #[test]
    fn test_parse_upload_time() {
        let expected = NaiveDate::from_ymd_opt(2019, 5, 14)
            .unwrap()
            .and_hms_micro_opt(17, 3, 6, 123456)
            .unwrap();
        assert_eq!(
            parse_upload_time("2019-05-14T17:03:06.123456Z"),
            Some(expected)
        );
        assert_eq!(
            parse_upload_time("2019-05-14T17:03:06Z"),
            NaiveDate::from_ymd_opt(2019, 5, 14)
                .unwrap()
                .and_hms_opt(17, 3, 6)
        );
        assert!(parse_upload_time("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_fetch_release_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/requests/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "info": {"version": "2.31.0"},
                    "releases": {
                        "2.30.0": [
                            {"upload_time_iso_8601": "2023-05-22T15:12:44.175243Z"},
                            {"upload_time_iso_8601": "2023-05-22T15:10:01.000000Z"}
                        ],
                        "2.31.0": [
                            {"upload_time_iso_8601": "2023-05-22T15:47:10.125443Z"}
                        ],
                        "3.0.0.dev0": []
                    }
                }"#,
            )
            .create_async()
            .await;

        let history = index(&server.url())
            .fetch_release_history("requests")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(history.len(), 2);

        let earliest = NaiveDate::from_ymd_opt(2023, 5, 22)
            .unwrap()
            .and_hms_opt(15, 10, 1)
            .unwrap();
        let v2_30 = Version::from_str("2.30.0").unwrap();
        assert_eq!(history.publication_time(&v2_30), Some(earliest));

        // Empty file list counts as absent
        let dev = Version::from_str("3.0.0.dev0").unwrap();
        assert!(history.publication_time(&dev).is_none());
    }

    #[tokio::test]
    async fn test_fetch_publication_time() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/foo/json")
            .with_status(200)
            .with_body(r#"{"releases": {"1.0.0": [{"upload_time_iso_8601": "2020-01-01T00:00:00Z"}]}}"#)
            .create_async()
            .await;

        let pypi = index(&server.url());
        let found = pypi
            .fetch_publication_time("foo", &Version::from_str("1.0.0").unwrap())
            .await;
        assert_eq!(
            found,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_releases_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken/json")
            .with_status(200)
            .with_body(r#"{"info": {}}"#)
            .create_async()
            .await;

        let result = index(&server.url()).fetch_release_history("broken").await;
        assert!(matches!(result, Err(RegistryError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_publication_time_absent_on_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ghost/json")
            .with_status(404)
            .create_async()
            .await;

        let found = index(&server.url())
            .fetch_publication_time("ghost", &Version::from_str("1.0").unwrap())
            .await;
        assert!(found.is_none());
    }
}
