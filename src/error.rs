//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with the version manifest file (fatal)
//! - ConfigError: Issues with the source configuration (fatal)
//! - SourceError: Issues with an upstream source; reported per service and
//!   never escalated to `AppError`

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("failed to serialize manifest {path}: {message}")]
    SerializeError { path: PathBuf, message: String },
}

/// Errors raised while querying one upstream source
///
/// These never abort a run; the orchestrator records them against the
/// failing service and moves on.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network request failed
    #[error("failed to fetch {service} releases from {url}: {message}")]
    NetworkError {
        service: String,
        url: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching {service} releases from {url}")]
    Timeout { service: String, url: String },

    /// Non-success HTTP status
    #[error("{url} returned HTTP {status} for {service}")]
    HttpStatus {
        service: String,
        url: String,
        status: u16,
    },

    /// Response did not have the expected shape
    #[error("invalid response for {service}: {message}")]
    InvalidResponse { service: String, message: String },

    /// Neither the primary nor the fallback download URL validated
    #[error("no valid download artifact for {service} {version} (tried {tried})")]
    NoValidArtifact {
        service: String,
        version: String,
        tried: String,
    },

    /// The version pinned in the manifest is not a plain X.Y.Z version
    #[error("pinned version '{version}' of {service} is not a X.Y.Z version")]
    InvalidPinnedVersion { service: String, version: String },

    /// The manifest entry cannot be used with this source's track kind
    #[error("manifest entry for {service} does not match its source: {message}")]
    EntryShapeMismatch { service: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the source configuration file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Tag pattern does not compile or has the wrong number of groups
    #[error("invalid tag pattern '{pattern}' for {service}: {message}")]
    InvalidPattern {
        service: String,
        pattern: String,
        message: String,
    },

    /// URL template uses an unknown placeholder
    #[error("invalid URL template '{template}' for {service}: {message}")]
    InvalidTemplate {
        service: String,
        template: String,
        message: String,
    },

    /// Two sources share a service name
    #[error("service '{service}' is configured more than once")]
    DuplicateService { service: String },

    /// --only / --exclude names a service with no source
    #[error("unknown service '{service}': expected one of {known}")]
    UnknownService { service: String, known: String },

    /// HTTP client could not be built
    #[error("failed to create HTTP client: {message}")]
    HttpClient { message: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Creates a new NetworkError
    pub fn network_error(
        service: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::NetworkError {
            service: service.into(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(service: impl Into<String>, url: impl Into<String>) -> Self {
        SourceError::Timeout {
            service: service.into(),
            url: url.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new EntryShapeMismatch error
    pub fn shape_mismatch(service: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::EntryShapeMismatch {
            service: service.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidPattern error
    pub fn invalid_pattern(
        service: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidPattern {
            service: service.into(),
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidTemplate error
    pub fn invalid_template(
        service: impl Into<String>,
        template: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidTemplate {
            service: service.into(),
            template: template.into(),
            message: message.into(),
        }
    }
}
