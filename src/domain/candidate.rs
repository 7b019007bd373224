//! Candidate versions produced by upstream sources

use super::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many release lines of a service the manifest keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// One pinned version, replaced when a newer one appears
    #[default]
    Single,
    /// Several independently maintained major.minor lines kept side by side
    Multi,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Single => write!(f, "single"),
            Track::Multi => write!(f, "multi"),
        }
    }
}

/// A version paired with a download URL that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: Version,
    pub download_url: String,
}

impl Candidate {
    pub fn new(version: Version, download_url: impl Into<String>) -> Self {
        Self {
            version,
            download_url: download_url.into(),
        }
    }
}

/// What an adapter hands back to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSet {
    /// Latest version for a single-track service
    Single(Candidate),
    /// Full ranked list (newest first) for a multi-track service
    Multi(Vec<Candidate>),
}
