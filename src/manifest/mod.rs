//! Version manifest model and persistence
//!
//! This module provides:
//! - The manifest document: service name → pinned artifact(s)
//! - Single-track `{version, downloadUrl}` and multi-track `{versions: [...]}` entries
//! - Fields svcup does not manage, and entries of unknown shape, kept as read
//! - ManifestStore for reading and atomically rewriting the manifest file

mod store;

pub use store::ManifestStore;

use crate::domain::Candidate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields of an entry that svcup does not manage, kept in file order
pub type ExtraFields = Map<String, Value>;

/// A pinned version and where to download it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedArtifact {
    pub version: String,
    pub download_url: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PinnedArtifact {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_url: download_url.into(),
            extra: ExtraFields::new(),
        }
    }

    pub fn with_extra(mut self, extra: ExtraFields) -> Self {
        self.extra = extra;
        self
    }
}

impl From<&Candidate> for PinnedArtifact {
    fn from(candidate: &Candidate) -> Self {
        Self::new(candidate.version.to_string(), candidate.download_url.clone())
    }
}

/// Maintained release lines of a multi-track service, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedList {
    pub versions: Vec<PinnedArtifact>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Manifest value for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    /// Several maintained lines, newest first
    Multi(PinnedList),
    /// One pinned version
    Single(PinnedArtifact),
    /// Any other value; kept verbatim, never reconciled
    Other(Value),
}

impl ManifestEntry {
    /// Pinned artifacts held by this entry, in stored order
    pub fn artifacts(&self) -> &[PinnedArtifact] {
        match self {
            ManifestEntry::Multi(list) => &list.versions,
            ManifestEntry::Single(artifact) => std::slice::from_ref(artifact),
            ManifestEntry::Other(_) => &[],
        }
    }

    /// Version strings held by this entry, in stored order
    pub fn versions(&self) -> Vec<&str> {
        self.artifacts().iter().map(|a| a.version.as_str()).collect()
    }
}

/// The whole manifest document, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: IndexMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, service: &str) -> Option<&ManifestEntry> {
        self.entries.get(service)
    }

    /// Replaces an entry; existing services keep their position in the file
    pub fn set(&mut self, service: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(service.into(), entry);
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes to the on-disk form: two-space indented JSON plus newline
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
