//! Reconciliation engine coordinating a whole run
//!
//! This module provides:
//! - Workflow coordination: load → fetch → classify → admit → persist
//! - The per-service step `(Manifest, adapter) → (Manifest, outcome)`
//! - Dry-run mode support
//! - Partial continuation when a single service fails

use crate::cli::CliArgs;
use crate::config::{load_sources, select_sources};
use crate::domain::{
    Candidate, CandidateSet, ServiceOutcome, ServiceReport, SummaryEntry, Track, UpdateSummary,
    UpdateType, Version,
};
use crate::error::{AppError, ManifestError, SourceError};
use crate::manifest::{
    ExtraFields, Manifest, ManifestEntry, ManifestStore, PinnedArtifact, PinnedList,
};
use crate::progress::Progress;
use crate::registry::{
    create_adapters, ArtifactValidator, HttpClient, VersionAdapter, DEFAULT_USER_AGENT,
};
use crate::update::classify;
use tracing::{debug, info, warn};

/// Engine folding every configured adapter over the manifest
pub struct Orchestrator {
    adapters: Vec<Box<dyn VersionAdapter>>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct RunReport {
    /// Manifest after all admitted changes
    pub manifest: Manifest,
    /// Accepted changes, partitioned by review need
    pub summary: UpdateSummary,
    /// One report per adapter, in run order
    pub services: Vec<ServiceReport>,
    /// Whether any service changed the manifest
    pub changed: bool,
    /// Whether the manifest file was rewritten
    pub manifest_written: bool,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ServiceReport> {
        self.services.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

impl Orchestrator {
    pub fn new(adapters: Vec<Box<dyn VersionAdapter>>) -> Self {
        Self { adapters }
    }

    /// Build the adapter list from CLI arguments and the source configuration
    pub fn from_args(args: &CliArgs) -> Result<Self, AppError> {
        let sources = load_sources(args.config.as_deref())?;
        let sources = select_sources(sources, &args.only, &args.exclude)?;

        let client = HttpClient::with_config(args.timeout(), DEFAULT_USER_AGENT)?
            .with_github_token(args.github_token.clone());
        let validator = ArtifactValidator::with_timeout(&client, args.probe_timeout());
        let adapters = create_adapters(&sources, &client, &validator)?;

        debug!(
            services = ?sources.iter().map(|s| s.service.as_str()).collect::<Vec<_>>(),
            "adapters configured"
        );
        Ok(Self::new(adapters))
    }

    /// Names of the services this engine checks, in run order
    pub fn services(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.service()).collect()
    }

    /// Load, reconcile and (unless dry-run) persist a manifest file
    ///
    /// The file is only rewritten when at least one service changed.
    pub async fn reconcile_file(
        &self,
        store: &ManifestStore,
        dry_run: bool,
        progress: &mut Progress,
    ) -> Result<RunReport, ManifestError> {
        let manifest = store.load()?;
        debug!(
            path = %store.path().display(),
            services = manifest.len(),
            "manifest loaded"
        );
        let mut report = self.run(manifest, progress).await;

        if report.changed && !dry_run {
            store.save(&report.manifest)?;
            report.manifest_written = true;
            info!(path = %store.path().display(), "manifest written");
        } else if report.changed {
            info!("dry run, manifest not written");
        } else {
            debug!("no changes, manifest left untouched");
        }

        Ok(report)
    }

    /// Run every adapter against the manifest, strictly one after another
    pub async fn run(&self, manifest: Manifest, progress: &mut Progress) -> RunReport {
        let mut manifest = manifest;
        let mut summary = UpdateSummary::new();
        let mut services = Vec::with_capacity(self.adapters.len());
        let total = self.adapters.len();

        for (index, adapter) in self.adapters.iter().enumerate() {
            progress.service(adapter.service(), index + 1, total);
            let (next, outcome) = reconcile_service(adapter.as_ref(), manifest).await;
            manifest = next;

            if let ServiceOutcome::Updated { entry } = &outcome {
                summary.record(entry.clone());
            }
            services.push(ServiceReport::new(adapter.service(), outcome));
        }
        progress.finish_and_clear();

        let changed = services.iter().any(|r| r.outcome.is_update());
        RunReport {
            manifest,
            summary,
            services,
            changed,
            manifest_written: false,
        }
    }
}

/// Reconcile one service, returning the manifest to carry forward
///
/// The manifest is only modified when the outcome is `Updated`; any failure
/// leaves the entry exactly as it was.
pub async fn reconcile_service(
    adapter: &dyn VersionAdapter,
    mut manifest: Manifest,
) -> (Manifest, ServiceOutcome) {
    let service = adapter.service();

    let outcome = match admit(adapter, &manifest).await {
        Ok(Admission::Replace { entry, summary }) => {
            info!(
                service,
                from = summary.from.as_deref().unwrap_or("(none)"),
                to = %summary.to,
                update_type = %summary.update_type,
                "update accepted"
            );
            manifest.set(service, entry);
            ServiceOutcome::Updated { entry: summary }
        }
        Ok(Admission::UpToDate(current)) => {
            info!(service, current = %current, "up to date");
            ServiceOutcome::UpToDate { current }
        }
        Ok(Admission::NoCandidate) => {
            info!(service, "no candidate");
            ServiceOutcome::NoCandidate
        }
        Err(e) => {
            warn!(service, error = %e, "service check failed");
            ServiceOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    (manifest, outcome)
}

/// Decision for one service, computed before anything is mutated
enum Admission {
    Replace {
        entry: ManifestEntry,
        summary: SummaryEntry,
    },
    UpToDate(String),
    NoCandidate,
}

async fn admit(adapter: &dyn VersionAdapter, manifest: &Manifest) -> Result<Admission, SourceError> {
    let service = adapter.service();
    let previous = manifest.get(service);
    let current = pinned_versions(service, adapter.track(), previous)?;

    let Some(candidates) = adapter.fetch_candidates(&current).await? else {
        return Ok(Admission::NoCandidate);
    };

    Ok(match candidates {
        CandidateSet::Single(candidate) => {
            admit_single(service, candidate, current.first(), previous)
        }
        CandidateSet::Multi(list) => admit_multi(service, list, &current, previous),
    })
}

/// Single-track policy: replace only when strictly newer
fn admit_single(
    service: &str,
    candidate: Candidate,
    current: Option<&Version>,
    previous: Option<&ManifestEntry>,
) -> Admission {
    let classification = classify(&candidate.version, current);
    let Some(update_type) = classification.update_type.filter(|_| classification.is_newer) else {
        let pinned = current.unwrap_or(&candidate.version);
        return Admission::UpToDate(pinned.to_string());
    };

    let summary = SummaryEntry::new(
        service,
        current.map(Version::to_string),
        candidate.version.to_string(),
        update_type,
    );
    let extra = match previous {
        Some(ManifestEntry::Single(artifact)) => artifact.extra.clone(),
        _ => ExtraFields::new(),
    };
    Admission::Replace {
        entry: ManifestEntry::Single(PinnedArtifact::from(&candidate).with_extra(extra)),
        summary,
    }
}

/// Multi-track policy: the ranked list replaces the entry wholesale when its
/// membership or any kept line's download URL differs from the pinned list
fn admit_multi(
    service: &str,
    list: Vec<Candidate>,
    current: &[Version],
    previous: Option<&ManifestEntry>,
) -> Admission {
    if list.is_empty() {
        return Admission::NoCandidate;
    }

    let pinned = previous.map(ManifestEntry::artifacts).unwrap_or(&[]);
    let mut changes = membership_changes(current, &list);
    changes.extend(url_changes(pinned, &list));
    if changes.is_empty() {
        return Admission::UpToDate(join_versions(current.iter()));
    }

    let from = (!current.is_empty()).then(|| join_versions(current.iter()));
    let to = join_versions(list.iter().map(|c| &c.version));
    let summary = SummaryEntry::new(service, from, to, UpdateType::Patch).with_changes(changes);

    let versions = list
        .iter()
        .map(|candidate| {
            let artifact = PinnedArtifact::from(candidate);
            match pinned_artifact(pinned, &candidate.version) {
                Some(kept) => artifact.with_extra(kept.extra.clone()),
                None => artifact,
            }
        })
        .collect();
    let extra = match previous {
        Some(ManifestEntry::Multi(pinned_list)) => pinned_list.extra.clone(),
        _ => ExtraFields::new(),
    };

    Admission::Replace {
        entry: ManifestEntry::Multi(PinnedList { versions, extra }),
        summary,
    }
}

/// `+v` for each added version in new order, then `-v` for each retired one
fn membership_changes(current: &[Version], list: &[Candidate]) -> Vec<String> {
    let added = list
        .iter()
        .filter(|c| !current.contains(&c.version))
        .map(|c| format!("+{}", c.version));
    let removed: Vec<String> = current
        .iter()
        .filter(|v| !list.iter().any(|c| &c.version == *v))
        .map(|v| format!("-{}", v))
        .collect();
    added.chain(removed).collect()
}

/// `~v` for each kept version whose download URL moved
fn url_changes(pinned: &[PinnedArtifact], list: &[Candidate]) -> Vec<String> {
    list.iter()
        .filter(|c| {
            pinned_artifact(pinned, &c.version)
                .is_some_and(|kept| kept.download_url != c.download_url)
        })
        .map(|c| format!("~{}", c.version))
        .collect()
}

fn pinned_artifact<'a>(
    pinned: &'a [PinnedArtifact],
    version: &Version,
) -> Option<&'a PinnedArtifact> {
    let version = version.to_string();
    pinned.iter().find(|a| a.version.trim() == version)
}

fn join_versions<'a>(versions: impl Iterator<Item = &'a Version>) -> String {
    versions
        .map(Version::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse the pinned version(s) of a manifest entry for an adapter's track
///
/// Empty version strings count as absent.
fn pinned_versions(
    service: &str,
    track: Track,
    entry: Option<&ManifestEntry>,
) -> Result<Vec<Version>, SourceError> {
    let Some(entry) = entry else {
        return Ok(Vec::new());
    };

    match (track, entry) {
        (_, ManifestEntry::Other(_)) => {
            return Err(SourceError::shape_mismatch(
                service,
                "entry holds neither {version, downloadUrl} nor {versions: [...]}",
            ));
        }
        (Track::Single, ManifestEntry::Multi(_)) => {
            return Err(SourceError::shape_mismatch(
                service,
                "single-track source but the entry holds a version list",
            ));
        }
        _ => {}
    }

    entry
        .versions()
        .into_iter()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<Version>()
                .map_err(|_| SourceError::InvalidPinnedVersion {
                    service: service.to_string(),
                    version: raw.to_string(),
                })
        })
        .collect()
}
