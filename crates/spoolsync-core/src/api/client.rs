//! HTTP transport for the Spoolman REST API.
//!
//! `HttpTransport` performs plain GET requests against `<host>/api/v1/` and
//! hands the decoded JSON document back to the sync layer. It never retries;
//! retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of every Spoolman REST endpoint
const API_PREFIX: &str = "api/v1";

/// Source of raw Spoolman documents.
///
/// `endpoint` is relative to the API root, e.g. `"spool"` or `"filament/12"`.
#[async_trait]
pub trait SpoolmanTransport: Send + Sync {
    async fn get_json(&self, endpoint: &str) -> Result<Value, ApiError>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `host` with the given request timeout
    pub fn new(host: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, host))
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.host, config.timeout())
    }

    /// Wrap an existing client, sharing its connection pool
    pub fn with_client(client: Client, host: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/{}", host.trim_end_matches('/'), API_PREFIX),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl SpoolmanTransport for HttpTransport {
    async fn get_json(&self, endpoint: &str) -> Result<Value, ApiError> {
        let url = self.endpoint_url(endpoint);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedBody(format!("{} from {}", e, url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_host_and_prefix() {
        let transport = HttpTransport::with_client(Client::new(), "http://printer.local:7912/");
        assert_eq!(transport.base_url(), "http://printer.local:7912/api/v1");
        assert_eq!(
            transport.endpoint_url("spool"),
            "http://printer.local:7912/api/v1/spool"
        );
        assert_eq!(
            transport.endpoint_url("/filament/12"),
            "http://printer.local:7912/api/v1/filament/12"
        );
    }

    #[test]
    fn test_from_config_uses_host() {
        let config = Config {
            host: "http://10.0.0.5:8000".to_string(),
            ..Config::default()
        };
        let transport = HttpTransport::from_config(&config).expect("client builds");
        assert_eq!(transport.base_url(), "http://10.0.0.5:8000/api/v1");
    }
}
