//! Core domain models for svcup
//!
//! This module contains the fundamental types used throughout the application:
//! - Canonical X.Y.Z versions
//! - Candidates produced by upstream sources and their track kind
//! - Update classification (patch / minor / major)
//! - Per-service outcomes and the run summary

mod candidate;
mod classification;
mod outcome;
mod summary;
mod version;

pub use candidate::{Candidate, CandidateSet, Track};
pub use classification::{UpdateClassification, UpdateType};
pub use outcome::{ServiceOutcome, ServiceReport};
pub use summary::{SummaryEntry, UpdateSummary};
pub use version::{InvalidVersion, Version};
