// Catalog Sync - VRT NU catalog aggregation and favorites synchronization
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP client for the catalog and favorites services
//!
//! The rest of the crate only sees the [`CatalogClient`] trait: hand it a
//! [`FetchRequest`] and get parsed JSON back, or a transport error carrying the
//! status code and body. [`HttpCatalogClient`] is the reqwest-backed
//! implementation.
//!
//! # Retry Strategy
//! - GET requests: up to `max_retries` attempts
//! - Exponential backoff: 1s, 2s, 4s between attempts
//! - Retry on: connection/timeout errors, 5xx responses
//! - No retry on: 4xx responses, any request with a body (favorites writes)
//!
//! Writes are left to the caller to retry because a favorites write that timed
//! out may still have been applied remotely.

use crate::config::ApiConfig;
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Maximum attempts for idempotent requests (1 initial + 2 retries)
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial retry delay in seconds (exponential backoff: 1s, 2s, 4s)
const INITIAL_RETRY_DELAY_SECS: u64 = 1;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One outbound request
///
/// A request without a body is sent as GET; a request with a JSON body is
/// sent as POST.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl FetchRequest {
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post<S: Into<String>>(url: S, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authorization, content type and referer headers shared by the
    /// authenticated endpoints
    pub fn authenticated(self, token: &str, referer: &str) -> Self {
        self.header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .header("Referer", referer)
    }

    pub fn is_idempotent(&self) -> bool {
        self.body.is_none()
    }
}

/// Remote catalog transport
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Perform the request and parse the response body as JSON
    async fn fetch(&self, request: FetchRequest) -> Result<Value>;
}

/// Configuration for HttpCatalogClient
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRY_ATTEMPTS,
            user_agent: format!("catalog-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            timeout: Duration::from_secs(api.timeout_secs),
            max_retries: api.max_retries.max(1),
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// reqwest-backed [`CatalogClient`]
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    config: ClientConfig,
}

impl HttpCatalogClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| CatalogError::InvalidInput(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a page as text (used for HTML scraping)
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "URL get");
        let response = self.client.get(url).send().await.map_err(|e| {
            CatalogError::network_error(format!("Network request failed: {}", e), is_retryable_network_error(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.text().await?)
    }

    fn build_request(&self, request: &FetchRequest) -> Result<reqwest::Request> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CatalogError::InvalidInput(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CatalogError::InvalidInput(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let url = Url::parse(&request.url)
            .map_err(|e| CatalogError::InvalidInput(format!("Invalid URL '{}': {}", request.url, e)))?;
        let builder = match &request.body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url),
        };

        Ok(builder.headers(headers).build()?)
    }

    /// Execute request with retry logic and exponential backoff
    async fn execute_with_retry(&self, request: &FetchRequest) -> Result<Value> {
        let max_attempts = if request.is_idempotent() {
            self.config.max_retries.max(1)
        } else {
            1
        };
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;
            let http_request = self.build_request(request)?;

            match self.client.execute(http_request).await {
                Ok(response) => {
                    let status = response.status();

                    match status {
                        s if s.is_success() => {
                            return handle_success_response(response).await;
                        }

                        s if s.is_server_error() && attempts < max_attempts => {
                            let error = error_from_response(response).await;
                            warn!(url = %request.url, status = s.as_u16(), attempts, "Server error, retrying");
                            last_error = Some(error);

                            let delay = Duration::from_secs(INITIAL_RETRY_DELAY_SECS * 2_u64.pow(attempts - 1));
                            sleep(delay).await;
                            continue;
                        }

                        _ => {
                            return Err(error_from_response(response).await);
                        }
                    }
                }

                Err(e) if attempts < max_attempts && is_retryable_network_error(&e) => {
                    warn!(url = %request.url, error = %e, attempts, "Network error, retrying");
                    last_error = Some(CatalogError::network_error(
                        format!("Network request failed: {}", e),
                        true,
                    ));

                    let delay = Duration::from_secs(INITIAL_RETRY_DELAY_SECS * 2_u64.pow(attempts - 1));
                    sleep(delay).await;
                    continue;
                }

                Err(e) => {
                    return Err(CatalogError::network_error(
                        format!("Network request failed: {}", e),
                        is_retryable_network_error(&e),
                    ));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CatalogError::ApiRequestFailed {
            message: format!("Request failed after {} attempts", attempts),
            status_code: None,
            endpoint: Some(request.url.clone()),
        }))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch(&self, request: FetchRequest) -> Result<Value> {
        let method = if request.is_idempotent() { "GET" } else { "POST" };
        debug!(url = %request.url, method, "URL fetch");
        self.execute_with_retry(&request).await
    }
}

/// Parse a successful response body, keeping context on failure
async fn handle_success_response(response: Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().clone();

    let response_text = response.text().await.map_err(|e| CatalogError::ApiRequestFailed {
        message: format!("Failed to read response body: {}", e),
        status_code: Some(status.as_u16()),
        endpoint: Some(url.path().to_string()),
    })?;

    // Favorites writes may answer with an empty body
    if response_text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&response_text).map_err(|e| {
        let snippet: String = response_text.chars().take(400).collect();
        CatalogError::invalid_response(
            format!("Parse error: {} at line {} col {}. Start: {}", e, e.line(), e.column(), snippet),
            Some(response_text.clone()),
        )
    })
}

/// Turn a non-success response into an `ApiRequestFailed` carrying status and body
async fn error_from_response(response: Response) -> CatalogError {
    let status = response.status();
    let endpoint = response.url().path().to_string();
    let error_body = response.text().await.unwrap_or_default();

    CatalogError::api_failed(
        format!("HTTP {}: {}", status.as_u16(), error_body),
        Some(status.as_u16()),
        Some(endpoint),
    )
}

fn is_retryable_network_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

// ===== TESTS =====
