//! Download artifact validation
//!
//! A constructed download URL is trusted only if its filename carries the
//! expected archive extension and a HEAD probe answers with a success status.
//! Network failures, timeouts and error statuses all mean "not valid".

use super::HttpClient;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single existence probe (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes candidate download URLs
#[derive(Clone)]
pub struct ArtifactValidator {
    client: Client,
    timeout: Duration,
}

impl ArtifactValidator {
    /// Create a validator sharing the given HTTP client
    pub fn new(client: &HttpClient) -> Self {
        Self::with_timeout(client, DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a validator with a custom probe timeout
    pub fn with_timeout(client: &HttpClient, timeout: Duration) -> Self {
        Self {
            client: client.inner().clone(),
            timeout,
        }
    }

    /// Returns true if the URL's filename ends with `extension`
    ///
    /// Query strings and fragments are not part of the filename.
    pub fn has_extension(url: &str, extension: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let file_name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        !file_name.is_empty()
            && file_name
                .to_ascii_lowercase()
                .ends_with(&extension.to_ascii_lowercase())
    }

    /// Check that the URL names a live archive
    pub async fn is_valid(&self, url: &str, extension: &str) -> bool {
        if !Self::has_extension(url, extension) {
            debug!(url, extension, "rejected: unexpected file extension");
            return false;
        }

        match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(url, status = response.status().as_u16(), "rejected: probe status");
                false
            }
            Err(e) => {
                debug!(url, error = %e, "rejected: probe failed");
                false
            }
        }
    }
}
