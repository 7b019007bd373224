//! Update classification types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of the most significant changed version component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Only the patch component moved; eligible for unattended merge
    Patch,
    /// Minor component moved; requires review
    Minor,
    /// Major component moved, or nothing was installed before; requires review
    Major,
}

impl UpdateType {
    /// Returns true if updates of this type must be reviewed by a human
    pub fn needs_review(&self) -> bool {
        !matches!(self, UpdateType::Patch)
    }

    /// Plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpdateType::Patch => "patch",
            UpdateType::Minor => "minor",
            UpdateType::Major => "major",
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of comparing a candidate against the pinned version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateClassification {
    pub is_newer: bool,
    /// Present only when `is_newer` is true
    pub update_type: Option<UpdateType>,
}

impl UpdateClassification {
    /// Candidate is ahead at the given position
    pub fn newer(update_type: UpdateType) -> Self {
        Self {
            is_newer: true,
            update_type: Some(update_type),
        }
    }

    /// Candidate is equal or behind
    pub fn not_newer() -> Self {
        Self {
            is_newer: false,
            update_type: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_review() {
        assert!(!UpdateType::Patch.needs_review());
        assert!(UpdateType::Minor.needs_review());
        assert!(UpdateType::Major.needs_review());
    }

    #[test]
    fn test_update_type_serde() {
        assert_eq!(
            serde_json::to_string(&UpdateType::Minor).unwrap(),
            "\"minor\""
        );
    }

    #[test]
    fn test_not_newer_has_no_type() {
        let c = UpdateClassification::not_newer();
        assert!(!c.is_newer);
        assert!(c.update_type.is_none());
    }
}
