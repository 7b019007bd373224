//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of a run report
//! - The summary in the same `{patch, majorMinor}` shape the CI output carries

use crate::domain::{ServiceReport, UpdateSummary};
use crate::orchestrator::RunReport;
use crate::output::OutputFormatter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    dry_run: bool,
}

impl JsonFormatter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    generated_at: DateTime<Utc>,
    dry_run: bool,
    manifest_written: bool,
    has_patch_updates: bool,
    has_major_minor_updates: bool,
    has_failures: bool,
    summary: &'a UpdateSummary,
    services: &'a [ServiceReport],
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            generated_at: Utc::now(),
            dry_run: self.dry_run,
            manifest_written: report.manifest_written,
            has_patch_updates: report.summary.has_patch_updates(),
            has_major_minor_updates: report.summary.has_major_minor_updates(),
            has_failures: report.has_failures(),
            summary: &report.summary,
            services: &report.services,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}
