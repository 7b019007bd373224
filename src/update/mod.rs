//! Version comparison and update classification
//!
//! This module provides:
//! - The comparator deciding whether a candidate is newer than the pinned version
//! - Classification of the change as patch, minor or major

use crate::domain::{UpdateClassification, UpdateType, Version};
use std::cmp::Ordering;

/// Classify a candidate against the currently pinned version
///
/// An absent current version is a first install and always classifies as a
/// major update, so it is surfaced for review rather than merged silently.
pub fn classify(candidate: &Version, current: Option<&Version>) -> UpdateClassification {
    let Some(current) = current else {
        return UpdateClassification::newer(UpdateType::Major);
    };

    let positions = [
        (candidate.major().cmp(&current.major()), UpdateType::Major),
        (candidate.minor().cmp(&current.minor()), UpdateType::Minor),
        (candidate.patch().cmp(&current.patch()), UpdateType::Patch),
    ];

    for (ordering, update_type) in positions {
        match ordering {
            Ordering::Equal => continue,
            Ordering::Greater => return UpdateClassification::newer(update_type),
            Ordering::Less => return UpdateClassification::not_newer(),
        }
    }

    UpdateClassification::not_newer()
}

/// Sort versions newest first and drop duplicates
pub fn rank_descending(versions: &mut Vec<Version>) {
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup();
}
