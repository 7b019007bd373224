//! Upstream source configuration
//!
//! Each tracked service is described by a `SourceConfig` record: where its
//! releases are listed, how tags map to X.Y.Z versions, and how download URLs
//! are built. The built-in list covers the bundled services; a TOML file
//! passed with `--config` replaces it:
//!
//! ```toml
//! [[source]]
//! service = "nginx"
//! tag_pattern = '^release-(\d+)\.(\d+)\.(\d+)$'
//! download_url = "https://nginx.org/download/nginx-{version}.zip"
//!
//! [source.listing]
//! kind = "github-releases"
//! repo = "nginx/nginx"
//! ```

use crate::domain::Track;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Archive extension every download must carry
pub const DEFAULT_EXTENSION: &str = ".zip";

/// Where a source's release names come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Listing {
    /// `GET {api_base}/repos/{repo}/tags`, names taken from `name`
    GithubTags {
        repo: String,
        #[serde(default = "default_api_base")]
        api_base: String,
    },
    /// `GET {api_base}/repos/{repo}/releases`, names taken from `tag_name`
    GithubReleases {
        repo: String,
        #[serde(default = "default_api_base")]
        api_base: String,
    },
    /// JSON object keyed by release line, each value carrying a `version`
    ReleaseIndex { url: String },
}

impl Listing {
    /// Endpoint queried for this listing
    pub fn url(&self) -> String {
        match self {
            Listing::GithubTags { repo, api_base } => {
                format!("{}/repos/{}/tags?per_page=100", api_base.trim_end_matches('/'), repo)
            }
            Listing::GithubReleases { repo, api_base } => format!(
                "{}/repos/{}/releases?per_page=100",
                api_base.trim_end_matches('/'),
                repo
            ),
            Listing::ReleaseIndex { url } => url.clone(),
        }
    }
}

fn default_api_base() -> String {
    GITHUB_API_URL.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

/// Configuration record for one tracked service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Manifest key
    pub service: String,
    #[serde(default)]
    pub track: Track,
    pub listing: Listing,
    /// Regex with three capture groups for major, minor and patch
    pub tag_pattern: String,
    /// Download URL template (`{version}`, `{major}`, `{minor}`, `{patch}`)
    pub download_url: String,
    /// Archival location tried when the primary URL does not validate
    #[serde(default)]
    pub fallback_url: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Top-level layout of a sources TOML file
#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(rename = "source", default)]
    sources: Vec<SourceConfig>,
}

/// Built-in sources for the bundled services
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            service: "nginx".to_string(),
            track: Track::Single,
            listing: Listing::GithubReleases {
                repo: "nginx/nginx".to_string(),
                api_base: default_api_base(),
            },
            tag_pattern: r"^release-(\d+)\.(\d+)\.(\d+)$".to_string(),
            download_url: "https://nginx.org/download/nginx-{version}.zip".to_string(),
            fallback_url: None,
            extension: default_extension(),
        },
        SourceConfig {
            service: "mariadb".to_string(),
            track: Track::Single,
            listing: Listing::GithubTags {
                repo: "MariaDB/server".to_string(),
                api_base: default_api_base(),
            },
            tag_pattern: r"^mariadb-(\d+)\.(\d+)\.(\d+)$".to_string(),
            download_url: "https://archive.mariadb.org/mariadb-{version}/winx64-packages/mariadb-{version}-winx64.zip".to_string(),
            fallback_url: None,
            extension: default_extension(),
        },
        SourceConfig {
            service: "php".to_string(),
            track: Track::Multi,
            listing: Listing::ReleaseIndex {
                url: "https://windows.php.net/downloads/releases/releases.json".to_string(),
            },
            tag_pattern: r"^(\d+)\.(\d+)\.(\d+)$".to_string(),
            download_url:
                "https://windows.php.net/downloads/releases/php-{version}-nts-Win32-vs16-x64.zip"
                    .to_string(),
            fallback_url: Some(
                "https://windows.php.net/downloads/releases/archives/php-{version}-nts-Win32-vs16-x64.zip"
                    .to_string(),
            ),
            extension: default_extension(),
        },
        SourceConfig {
            service: "phpmyadmin".to_string(),
            track: Track::Single,
            listing: Listing::GithubTags {
                repo: "phpmyadmin/phpmyadmin".to_string(),
                api_base: default_api_base(),
            },
            tag_pattern: r"^RELEASE_(\d+)_(\d+)_(\d+)$".to_string(),
            download_url:
                "https://files.phpmyadmin.net/phpMyAdmin/{version}/phpMyAdmin-{version}-all-languages.zip"
                    .to_string(),
            fallback_url: None,
            extension: default_extension(),
        },
    ]
}

/// Parse sources from TOML text
pub fn parse_sources(content: &str, path: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let file: SourcesFile = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    check_unique(&file.sources)?;
    Ok(file.sources)
}

/// Load sources from a TOML file, or the built-in list when no file is given
pub fn load_sources(path: Option<&Path>) -> Result<Vec<SourceConfig>, ConfigError> {
    let Some(path) = path else {
        return Ok(default_sources());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_sources(&content, path)
}

/// Keep the sources selected by `--only` / `--exclude`
///
/// Naming a service that has no source is a configuration error.
pub fn select_sources(
    sources: Vec<SourceConfig>,
    only: &[String],
    exclude: &[String],
) -> Result<Vec<SourceConfig>, ConfigError> {
    let known: Vec<&str> = sources.iter().map(|s| s.service.as_str()).collect();
    for name in only.iter().chain(exclude.iter()) {
        if !known.contains(&name.as_str()) {
            return Err(ConfigError::UnknownService {
                service: name.clone(),
                known: known.join(", "),
            });
        }
    }

    Ok(sources
        .into_iter()
        .filter(|s| only.is_empty() || only.contains(&s.service))
        .filter(|s| !exclude.contains(&s.service))
        .collect())
}

fn check_unique(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.service.as_str()) {
            return Err(ConfigError::DuplicateService {
                service: source.service.clone(),
            });
        }
    }
    Ok(())
}
