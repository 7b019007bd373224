//! Per-service reconciliation outcomes

use super::SummaryEntry;
use serde::Serialize;
use std::fmt;

/// What happened to one service during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceOutcome {
    /// The manifest entry was replaced
    Updated { entry: SummaryEntry },
    /// The pinned version is already the latest
    UpToDate { current: String },
    /// The source produced nothing usable this run
    NoCandidate,
    /// The source failed; the manifest entry is untouched
    Failed { reason: String },
}

impl ServiceOutcome {
    pub fn is_update(&self) -> bool {
        matches!(self, ServiceOutcome::Updated { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ServiceOutcome::Failed { .. })
    }
}

impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceOutcome::Updated { entry } => write!(
                f,
                "{} -> {} [{}]",
                entry.from.as_deref().unwrap_or("(none)"),
                entry.to,
                entry.update_type
            ),
            ServiceOutcome::UpToDate { current } => write!(f, "up to date ({})", current),
            ServiceOutcome::NoCandidate => write!(f, "no candidate"),
            ServiceOutcome::Failed { reason } => write!(f, "error: {}", reason),
        }
    }
}

/// Outcome paired with the service it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub service: String,
    #[serde(flatten)]
    pub outcome: ServiceOutcome,
}

impl ServiceReport {
    pub fn new(service: impl Into<String>, outcome: ServiceOutcome) -> Self {
        Self {
            service: service.into(),
            outcome,
        }
    }
}
