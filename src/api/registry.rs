//! Provides a client for querying a package registry for the latest published version.
//!
//! The registry is expected to speak the npm protocol: `GET /<package>/latest` answers
//! with the manifest of the most recent release.

use crate::config::DEFAULT_REGISTRY_URL;
use crate::error::UpdateCheckError;
use crate::models::RegistryLatest;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An asynchronous client for the package registry.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Creates a new `RegistryClient` against the public npm registry.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_REGISTRY_URL)
    }

    /// Creates a new `RegistryClient` with a custom base URL (a mirror, or a mock server in tests).
    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the latest published version string of `package`.
    ///
    /// Scoped names (`@scope/name`) are sent with the slash encoded, as npm expects.
    pub async fn latest_version(&self, package: &str) -> Result<String, UpdateCheckError> {
        let url = format!("{}/{}/latest", self.base_url, package.replace('/', "%2F"));
        debug!("Querying registry: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status().unwrap_or_default();
                debug!("Registry request to {} failed with status {}", url, status);
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(UpdateCheckError::Response(format!(
                        "package '{}' is not published on {}",
                        package, self.base_url
                    )));
                }
                return Err(UpdateCheckError::Registry(e));
            },
        };

        let body = response.text().await?;
        let latest: RegistryLatest = serde_json::from_str(&body)
            .map_err(|e| UpdateCheckError::Response(format!("malformed manifest: {}", e)))?;

        debug!("Latest published version of {} is {}", package, latest.version);
        Ok(latest.version)
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}
