//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Bounded timeout and a recognizable User-Agent
//! - Optional GitHub token for API listings
//! - Error mapping into per-service SourceError values
//!
//! Requests are never retried: a failed call fails that service for this
//! run, and the next scheduled run is the retry.

use crate::error::{ConfigError, SourceError};
use reqwest::header::LINK;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Default timeout for listing requests (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("svcup/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper used by every source
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    github_token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            github_token: None,
        })
    }

    /// Set the token sent with GitHub API listings
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a JSON document, kept loosely typed for defensive extraction
    pub async fn get_json(&self, url: &str, service: &str) -> Result<serde_json::Value, SourceError> {
        self.send_json(self.client.get(url), url, service).await
    }

    /// GET one page of a GitHub REST API listing
    ///
    /// Returns the page body and the `rel="next"` link from the `Link`
    /// header, if there is one.
    pub async fn get_github_page(
        &self,
        url: &str,
        service: &str,
    ) -> Result<(serde_json::Value, Option<String>), SourceError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.github_token {
            request = request.bearer_auth(token);
        }

        let response = self.send(request, url, service).await?;
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_link);
        let body = read_json(response, url, service).await?;
        Ok((body, next))
    }

    async fn send_json(
        &self,
        request: RequestBuilder,
        url: &str,
        service: &str,
    ) -> Result<serde_json::Value, SourceError> {
        let response = self.send(request, url, service).await?;
        read_json(response, url, service).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
        service: &str,
    ) -> Result<Response, SourceError> {
        debug!(service, url, "fetching release listing");

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(e, url, service))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                service: service.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

async fn read_json(
    response: Response,
    url: &str,
    service: &str,
) -> Result<serde_json::Value, SourceError> {
    response.json::<serde_json::Value>().await.map_err(|e| {
        if e.is_timeout() {
            SourceError::timeout(service, url)
        } else {
            SourceError::invalid_response(service, format!("failed to parse JSON: {}", e))
        }
    })
}

/// Extract the `rel="next"` target from a `Link` header value
///
/// `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            param
                .trim()
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
                .unwrap_or(false)
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

fn map_request_error(e: reqwest::Error, url: &str, service: &str) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(service, url)
    } else {
        SourceError::network_error(service, url, e.to_string())
    }
}
