//! Update summary types
//!
//! The summary is the run's externally visible result: accepted changes split
//! into the patch bucket (unattended merge) and the majorMinor bucket (review).

use super::UpdateType;
use serde::{Deserialize, Serialize};

/// One accepted change to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Service name as keyed in the manifest
    pub service: String,
    /// Previously pinned version(s); None for a first install
    pub from: Option<String>,
    /// Newly pinned version(s)
    pub to: String,
    /// Classification of the change
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    /// Multi-track changes: `+8.3.15` added, `-8.3.14` retired, `~8.2.27` new download URL
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
}

impl SummaryEntry {
    /// Creates an entry for a single-track service
    pub fn new(
        service: impl Into<String>,
        from: Option<String>,
        to: impl Into<String>,
        update_type: UpdateType,
    ) -> Self {
        Self {
            service: service.into(),
            from,
            to: to.into(),
            update_type,
            changes: Vec::new(),
        }
    }

    /// Attaches multi-track list changes
    pub fn with_changes(mut self, changes: Vec<String>) -> Self {
        self.changes = changes;
        self
    }

    /// Returns true if this change must be reviewed before promotion
    pub fn needs_review(&self) -> bool {
        self.update_type.needs_review()
    }
}

/// All changes accepted during one run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Patch-level changes
    pub patch: Vec<SummaryEntry>,
    /// Minor and major changes
    #[serde(rename = "majorMinor")]
    pub major_minor: Vec<SummaryEntry>,
}

impl UpdateSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry in the bucket its classification selects
    pub fn record(&mut self, entry: SummaryEntry) {
        if entry.needs_review() {
            self.major_minor.push(entry);
        } else {
            self.patch.push(entry);
        }
    }

    pub fn has_patch_updates(&self) -> bool {
        !self.patch.is_empty()
    }

    pub fn has_major_minor_updates(&self) -> bool {
        !self.major_minor.is_empty()
    }

    /// Returns the total number of accepted changes
    pub fn total_updates(&self) -> usize {
        self.patch.len() + self.major_minor.len()
    }

    /// Returns true if nothing changed
    pub fn is_empty(&self) -> bool {
        self.total_updates() == 0
    }

    /// Iterates over every entry, patch bucket first
    pub fn entries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.patch.iter().chain(self.major_minor.iter())
    }
}
