//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Status code to RegistryError mapping
//!
//! Lookups are never retried: a failed request is reported once and the
//! package is skipped for the run.

use crate::error::RegistryError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_USER_AGENT: &str = concat!("spec0-bot/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client for index lookups and the hosting API
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Client with the 10 second deadline and the bot's User-Agent
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map(|client| Self { client })
            .map_err(|e| RegistryError::network_error("", "HTTP client", e.to_string()))
    }

    /// The wrapped reqwest client, for requests that are not index lookups
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET `url` on behalf of `package`, mapping transport and status failures
    pub async fn get_with_context(
        &self,
        url: &str,
        package: &str,
        index: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(RegistryError::timeout(package, index)),
            Err(e) => return Err(RegistryError::network_error(package, index, e.to_string())),
        };

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(RegistryError::package_not_found(package, index)),
            status => Err(RegistryError::network_error(
                package,
                index,
                format!("HTTP {}", status),
            )),
        }
    }

    /// GET `url` and decode the body as `T`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        index: &str,
    ) -> Result<T, RegistryError> {
        self.get_with_context(url, package, index)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RegistryError::invalid_response(package, index, e.to_string()))
    }
}
