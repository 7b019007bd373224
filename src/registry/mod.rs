//! Upstream source adapters
//!
//! This module provides:
//! - HTTP client shared foundation
//! - Artifact validation for download URLs
//! - GitHub tag/release and release-index listings
//! - The configuration-driven adapter implementing `VersionAdapter`

mod client;
mod github;
mod release_index;
mod source;
mod template;
mod validator;

pub use client::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use source::SourceAdapter;
pub use template::UrlTemplate;
pub use validator::{ArtifactValidator, DEFAULT_PROBE_TIMEOUT};

use crate::config::SourceConfig;
use crate::domain::{CandidateSet, Track, Version};
use crate::error::{ConfigError, SourceError};
use async_trait::async_trait;

/// Capability shared by every tracked service's adapter
#[async_trait]
pub trait VersionAdapter: Send + Sync {
    /// Manifest key of the service
    fn service(&self) -> &str;

    /// Whether the service keeps one or several release lines
    fn track(&self) -> Track;

    /// Fetch candidate(s) given the currently pinned version(s)
    ///
    /// `Ok(None)` means the upstream offered nothing usable; it is not an error.
    async fn fetch_candidates(
        &self,
        current: &[Version],
    ) -> Result<Option<CandidateSet>, SourceError>;
}

/// Build one adapter per configured source
pub fn create_adapters(
    sources: &[SourceConfig],
    client: &HttpClient,
    validator: &ArtifactValidator,
) -> Result<Vec<Box<dyn VersionAdapter>>, ConfigError> {
    sources
        .iter()
        .map(|config| {
            SourceAdapter::from_config(config, client.clone(), validator.clone())
                .map(|adapter| Box::new(adapter) as Box<dyn VersionAdapter>)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sources;

    #[test]
    fn test_create_adapters_for_defaults() {
        let client = HttpClient::new().unwrap();
        let validator = ArtifactValidator::new(&client);
        let adapters = create_adapters(&default_sources(), &client, &validator).unwrap();

        let services: Vec<_> = adapters.iter().map(|a| a.service()).collect();
        assert_eq!(services, vec!["nginx", "mariadb", "php", "phpmyadmin"]);
        assert_eq!(adapters[2].track(), Track::Multi);
        assert_eq!(adapters[0].track(), Track::Single);
    }
}
