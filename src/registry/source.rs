//! Configuration-driven source adapter
//!
//! One driver serves every tracked service: it lists raw release names,
//! normalizes them through the source's tag pattern, ranks the survivors
//! newest first and resolves download URLs through the artifact validator.

use crate::config::{Listing, SourceConfig};
use crate::domain::{Candidate, CandidateSet, Track, Version};
use crate::error::{ConfigError, SourceError};
use crate::registry::{
    github, release_index, ArtifactValidator, HttpClient, UrlTemplate, VersionAdapter,
};
use crate::update::rank_descending;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

/// Adapter built from a `SourceConfig`
pub struct SourceAdapter {
    service: String,
    track: Track,
    listing: Listing,
    tag_pattern: Regex,
    download: UrlTemplate,
    fallback: Option<UrlTemplate>,
    extension: String,
    client: HttpClient,
    validator: ArtifactValidator,
}

impl SourceAdapter {
    /// Compile a configuration record into an adapter
    pub fn from_config(
        config: &SourceConfig,
        client: HttpClient,
        validator: ArtifactValidator,
    ) -> Result<Self, ConfigError> {
        let tag_pattern = Regex::new(&config.tag_pattern).map_err(|e| {
            ConfigError::invalid_pattern(&config.service, &config.tag_pattern, e.to_string())
        })?;
        // group 0 is the whole match
        if tag_pattern.captures_len() != 4 {
            return Err(ConfigError::invalid_pattern(
                &config.service,
                &config.tag_pattern,
                "expected exactly three capture groups (major, minor, patch)",
            ));
        }

        let download = UrlTemplate::parse(&config.download_url).map_err(|message| {
            ConfigError::invalid_template(&config.service, &config.download_url, message)
        })?;
        let fallback = config
            .fallback_url
            .as_deref()
            .map(|raw| {
                UrlTemplate::parse(raw)
                    .map_err(|message| ConfigError::invalid_template(&config.service, raw, message))
            })
            .transpose()?;

        Ok(Self {
            service: config.service.clone(),
            track: config.track,
            listing: config.listing.clone(),
            tag_pattern,
            download,
            fallback,
            extension: config.extension.clone(),
            client,
            validator,
        })
    }

    /// Map a raw tag to canonical X.Y.Z, or None if it does not qualify
    pub fn normalize_tag(&self, tag: &str) -> Option<Version> {
        let caps = self.tag_pattern.captures(tag.trim())?;
        let joined = format!("{}.{}.{}", &caps[1], &caps[2], &caps[3]);
        joined.parse().ok()
    }

    /// Normalize, filter and rank raw release names, newest first
    pub fn extract_versions(&self, raw: &[String]) -> Vec<Version> {
        let mut versions: Vec<Version> =
            raw.iter().filter_map(|tag| self.normalize_tag(tag)).collect();
        rank_descending(&mut versions);
        versions
    }

    async fn list_raw(&self) -> Result<Vec<String>, SourceError> {
        let url = self.listing.url();
        match &self.listing {
            Listing::GithubTags { .. } => {
                github::fetch_tag_names(&self.client, &url, &self.service).await
            }
            Listing::GithubReleases { .. } => {
                github::fetch_release_tags(&self.client, &url, &self.service).await
            }
            Listing::ReleaseIndex { .. } => {
                release_index::fetch_index_versions(&self.client, &url, &self.service).await
            }
        }
    }

    /// Find a download URL that validates, trying the fallback second
    async fn resolve(&self, version: &Version) -> Result<Candidate, SourceError> {
        let mut tried = Vec::new();
        for template in std::iter::once(&self.download).chain(self.fallback.iter()) {
            let url = template.render(version);
            if self.validator.is_valid(&url, &self.extension).await {
                debug!(service = %self.service, %version, url = %url, "artifact validated");
                return Ok(Candidate::new(version.clone(), url));
            }
            tried.push(url);
        }

        Err(SourceError::NoValidArtifact {
            service: self.service.clone(),
            version: version.to_string(),
            tried: tried.join(", "),
        })
    }
}

#[async_trait]
impl VersionAdapter for SourceAdapter {
    fn service(&self) -> &str {
        &self.service
    }

    fn track(&self) -> Track {
        self.track
    }

    /// Single-track: the newest version, probed only if it is ahead of the
    /// pinned one. A candidate that is not ahead is returned unprobed and is
    /// never admitted by the orchestrator.
    ///
    /// Multi-track: every listed line, each with a validated URL.
    async fn fetch_candidates(
        &self,
        current: &[Version],
    ) -> Result<Option<CandidateSet>, SourceError> {
        let raw = self.list_raw().await?;
        let versions = self.extract_versions(&raw);
        info!(
            service = %self.service,
            track = %self.track,
            listed = raw.len(),
            admitted = versions.len(),
            "release listing fetched"
        );

        if versions.is_empty() {
            return Ok(None);
        }

        match self.track {
            Track::Single => {
                let latest = &versions[0];
                if current.first().is_some_and(|pinned| latest <= pinned) {
                    let url = self.download.render(latest);
                    return Ok(Some(CandidateSet::Single(Candidate::new(latest.clone(), url))));
                }
                let candidate = self.resolve(latest).await?;
                Ok(Some(CandidateSet::Single(candidate)))
            }
            Track::Multi => {
                let mut candidates = Vec::with_capacity(versions.len());
                for version in &versions {
                    candidates.push(self.resolve(version).await?);
                }
                Ok(Some(CandidateSet::Multi(candidates)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sources;
    use mockito::{Matcher, Server, ServerGuard};

    fn adapter_for(config: &SourceConfig) -> SourceAdapter {
        let client = HttpClient::new().unwrap();
        let validator = ArtifactValidator::new(&client);
        SourceAdapter::from_config(config, client, validator).unwrap()
    }

    fn default_adapter(service: &str) -> SourceAdapter {
        let config = default_sources()
            .into_iter()
            .find(|s| s.service == service)
            .unwrap();
        adapter_for(&config)
    }

    fn mock_config(server: &ServerGuard, track: Track, listing: Listing) -> SourceConfig {
        SourceConfig {
            service: "nginx".to_string(),
            track,
            listing,
            tag_pattern: r"^release-(\d+)\.(\d+)\.(\d+)$".to_string(),
            download_url: format!("{}/download/nginx-{{version}}.zip", server.url()),
            fallback_url: Some(format!("{}/archive/nginx-{{version}}.zip", server.url())),
            extension: ".zip".to_string(),
        }
    }

    fn tags_listing(server: &ServerGuard) -> Listing {
        Listing::GithubTags {
            repo: "nginx/nginx".to_string(),
            api_base: server.url(),
        }
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_tag_per_upstream_scheme() {
        assert_eq!(
            default_adapter("nginx").normalize_tag("release-1.27.5"),
            Some(v("1.27.5"))
        );
        assert_eq!(
            default_adapter("mariadb").normalize_tag("mariadb-11.4.2"),
            Some(v("11.4.2"))
        );
        assert_eq!(
            default_adapter("phpmyadmin").normalize_tag("RELEASE_5_2_1"),
            Some(v("5.2.1"))
        );
        assert_eq!(default_adapter("php").normalize_tag("8.3.15"), Some(v("8.3.15")));
    }

    #[test]
    fn test_normalize_tag_drops_prereleases_and_noise() {
        let phpmyadmin = default_adapter("phpmyadmin");
        assert_eq!(phpmyadmin.normalize_tag("RELEASE_5_2_0RC1"), None);
        assert_eq!(phpmyadmin.normalize_tag("STABLE"), None);

        let nginx = default_adapter("nginx");
        assert_eq!(nginx.normalize_tag("release-1.27"), None);
        assert_eq!(nginx.normalize_tag("release-1.27.5-rc1"), None);
    }

    #[test]
    fn test_extract_versions_ranks_newest_first() {
        let adapter = default_adapter("mariadb");
        let raw: Vec<String> = [
            "mariadb-10.11.10",
            "mariadb-11.4.2",
            "mariadb-11.4.10",
            "mariadb-11.4.2",
            "mariadb-11.7.1-rc",
            "columnstore-1.0.0",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            adapter.extract_versions(&raw),
            vec![v("11.4.10"), v("11.4.2"), v("10.11.10")]
        );
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let mut config = default_sources().remove(0);
        config.tag_pattern = r"^release-(\d+)\.(\d+)$".to_string();
        let client = HttpClient::new().unwrap();
        let validator = ArtifactValidator::new(&client);
        let result = SourceAdapter::from_config(&config, client, validator);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_from_config_rejects_bad_template() {
        let mut config = default_sources().remove(0);
        config.fallback_url = Some("https://x/{arch}/{version}.zip".to_string());
        let client = HttpClient::new().unwrap();
        let validator = ArtifactValidator::new(&client);
        let result = SourceAdapter::from_config(&config, client, validator);
        assert!(matches!(result, Err(ConfigError::InvalidTemplate { .. })));
    }

    #[tokio::test]
    async fn test_single_track_latest_validated() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
            .with_status(200)
            .with_body(r#"[{"name": "release-1.27.4"}, {"name": "release-1.27.5"}]"#)
            .create_async()
            .await;
        let head = server
            .mock("HEAD", "/download/nginx-1.27.5.zip")
            .with_status(200)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        let result = adapter.fetch_candidates(&[v("1.27.4")]).await.unwrap();

        head.assert_async().await;
        match result {
            Some(CandidateSet::Single(candidate)) => {
                assert_eq!(candidate.version, v("1.27.5"));
                assert_eq!(
                    candidate.download_url,
                    format!("{}/download/nginx-1.27.5.zip", server.url())
                );
            }
            other => panic!("expected single candidate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_track_uses_fallback() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
            .with_status(200)
            .with_body(r#"[{"name": "release-1.27.5"}]"#)
            .create_async()
            .await;
        let _primary = server
            .mock("HEAD", "/download/nginx-1.27.5.zip")
            .with_status(404)
            .create_async()
            .await;
        let fallback = server
            .mock("HEAD", "/archive/nginx-1.27.5.zip")
            .with_status(200)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        let result = adapter.fetch_candidates(&[]).await.unwrap();

        fallback.assert_async().await;
        let Some(CandidateSet::Single(candidate)) = result else {
            panic!("expected single candidate");
        };
        assert!(candidate.download_url.ends_with("/archive/nginx-1.27.5.zip"));
    }

    #[tokio::test]
    async fn test_single_track_no_valid_artifact() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
            .with_status(200)
            .with_body(r#"[{"name": "release-1.27.5"}]"#)
            .create_async()
            .await;
        let _primary = server
            .mock("HEAD", "/download/nginx-1.27.5.zip")
            .with_status(404)
            .create_async()
            .await;
        let _fallback = server
            .mock("HEAD", "/archive/nginx-1.27.5.zip")
            .with_status(404)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        let err = adapter.fetch_candidates(&[]).await.unwrap_err();
        assert!(matches!(err, SourceError::NoValidArtifact { .. }));
    }

    #[tokio::test]
    async fn test_single_track_up_to_date_skips_probe() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
            .with_status(200)
            .with_body(r#"[{"name": "release-1.27.4"}]"#)
            .create_async()
            .await;
        let head = server
            .mock("HEAD", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        let result = adapter.fetch_candidates(&[v("1.27.4")]).await.unwrap();

        head.assert_async().await;
        let Some(CandidateSet::Single(candidate)) = result else {
            panic!("expected single candidate");
        };
        assert_eq!(candidate.version, v("1.27.4"));
    }

    #[tokio::test]
    async fn test_no_matching_tags_is_none() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
            .with_status(200)
            .with_body(r#"[{"name": "stable-1.26"}, {"name": "release-1.29.0-beta"}]"#)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        assert_eq!(adapter.fetch_candidates(&[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_track_returns_ranked_list() {
        let mut server = Server::new_async().await;
        let _index = server
            .mock("GET", "/releases.json")
            .with_status(200)
            .with_body(
                r#"{"8.1": {"version": "8.1.31"}, "8.3": {"version": "8.3.15"}, "8.2": {"version": "8.2.27"}}"#,
            )
            .create_async()
            .await;
        let _heads = server
            .mock("HEAD", Matcher::Regex(r"^/download/".to_string()))
            .with_status(200)
            .expect(3)
            .create_async()
            .await;

        let mut config = mock_config(
            &server,
            Track::Multi,
            Listing::ReleaseIndex {
                url: format!("{}/releases.json", server.url()),
            },
        );
        config.service = "php".to_string();
        config.tag_pattern = r"^(\d+)\.(\d+)\.(\d+)$".to_string();

        let adapter = adapter_for(&config);
        let result = adapter.fetch_candidates(&[v("8.3.14")]).await.unwrap();

        let Some(CandidateSet::Multi(candidates)) = result else {
            panic!("expected multi candidates");
        };
        let versions: Vec<_> = candidates.iter().map(|c| c.version.to_string()).collect();
        assert_eq!(versions, vec!["8.3.15", "8.2.27", "8.1.31"]);
    }

    #[tokio::test]
    async fn test_releases_listing_error_propagates() {
        let mut server = Server::new_async().await;
        let _releases = server
            .mock(
                "GET",
                Matcher::Regex(r"^/repos/nginx/nginx/releases".to_string()),
            )
            .with_status(500)
            .create_async()
            .await;

        let listing = Listing::GithubReleases {
            repo: "nginx/nginx".to_string(),
            api_base: server.url(),
        };
        let adapter = adapter_for(&mock_config(&server, Track::Single, listing));
        let err = adapter.fetch_candidates(&[]).await.unwrap_err();
        assert!(matches!(err, SourceError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_latest_found_on_second_listing_page() {
        let mut server = Server::new_async().await;
        let first_page = (0..100)
            .map(|n| format!(r#"{{"name": "release-1.25.{}"}}"#, n))
            .collect::<Vec<_>>()
            .join(",");
        let _first = server
            .mock("GET", "/repos/nginx/nginx/tags")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .with_status(200)
            .with_header(
                "link",
                &format!("<{}/repos/nginx/nginx/tags?page=2>; rel=\"next\"", server.url()),
            )
            .with_body(format!("[{}]", first_page))
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/repos/nginx/nginx/tags")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(r#"[{"name": "release-1.27.5"}]"#)
            .create_async()
            .await;
        let _head = server
            .mock("HEAD", "/download/nginx-1.27.5.zip")
            .with_status(200)
            .create_async()
            .await;

        let adapter = adapter_for(&mock_config(&server, Track::Single, tags_listing(&server)));
        let result = adapter.fetch_candidates(&[]).await.unwrap();

        match result {
            Some(CandidateSet::Single(candidate)) => assert_eq!(candidate.version, v("1.27.5")),
            other => panic!("expected single candidate, got {:?}", other),
        }
    }
}
