//! Text output formatter for human-readable display
//!
//! One line per checked service (update, up to date, no candidate or error),
//! followed by a summary split into auto-merge and review buckets.

use crate::domain::{ServiceOutcome, ServiceReport, UpdateSummary, UpdateType};
use crate::orchestrator::RunReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
    color: bool,
}

impl TextFormatter {
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn dry_run_prefix(&self) -> String {
        match (self.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn type_label(&self, update_type: UpdateType) -> String {
        if !self.color {
            return update_type.label().to_string();
        }
        match update_type {
            UpdateType::Major => update_type.label().red().bold().to_string(),
            UpdateType::Minor => update_type.label().yellow().to_string(),
            UpdateType::Patch => update_type.label().green().to_string(),
        }
    }

    fn format_service_line(
        &self,
        report: &ServiceReport,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", report.service, width = name_width);

        match &report.outcome {
            ServiceOutcome::Updated { entry } => {
                let from = entry.from.as_deref().unwrap_or("(none)");
                if self.color {
                    write!(
                        writer,
                        "  {} {} {} {} [{}]",
                        name.bold(),
                        from.dimmed(),
                        "→".dimmed(),
                        entry.to.bright_white().bold(),
                        self.type_label(entry.update_type)
                    )?;
                } else {
                    write!(
                        writer,
                        "  {} {} -> {} [{}]",
                        name,
                        from,
                        entry.to,
                        self.type_label(entry.update_type)
                    )?;
                }
                if !entry.changes.is_empty() {
                    write!(writer, " {}", entry.changes.join(" "))?;
                }
                writeln!(writer)
            }
            ServiceOutcome::Failed { reason } => {
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {}",
                        name,
                        "✗".red(),
                        format!("error: {}", reason).red()
                    )
                } else {
                    writeln!(writer, "  {} error: {}", name, reason)
                }
            }
            other => {
                if self.color {
                    writeln!(writer, "  {}", format!("{} {}", name, other).dimmed())
                } else {
                    writeln!(writer, "  {} {}", name, other)
                }
            }
        }
    }

    fn format_manifest_status(
        &self,
        report: &RunReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let status = if report.manifest_written {
            "Manifest updated"
        } else if report.changed {
            "Manifest not written"
        } else {
            "Manifest unchanged"
        };
        if self.color {
            writeln!(writer, "  {}", status.dimmed())
        } else {
            writeln!(writer, "  {}", status)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&report.summary, writer);
        }

        let name_width = report
            .services
            .iter()
            .map(|r| r.service.len())
            .max()
            .unwrap_or(0)
            .max(12);

        for service in &report.services {
            self.format_service_line(service, name_width, writer)?;
        }
        writeln!(writer)?;

        self.format_summary(&report.summary, writer)?;

        let failed = report.failures().count();
        if failed > 0 {
            if self.color {
                writeln!(writer, "  {} service(s) failed", failed.to_string().red())?;
            } else {
                writeln!(writer, "  {} service(s) failed", failed)?;
            }
        }

        if self.verbosity == Verbosity::Verbose {
            self.format_manifest_status(report, writer)?;
        }

        Ok(())
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = summary.total_updates();

        if self.verbosity == Verbosity::Quiet {
            return match (updates, self.color) {
                (0, true) => writeln!(writer, "{}{}", prefix, "No updates".dimmed()),
                (0, false) => writeln!(writer, "{}No updates", prefix),
                (n, true) => writeln!(writer, "{}{} updated", prefix, n.to_string().green()),
                (n, false) => writeln!(writer, "{}{} updated", prefix, n),
            };
        }

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
        }

        if summary.is_empty() {
            if self.color {
                writeln!(writer, "  {}", "No services updated".dimmed())?;
            } else {
                writeln!(writer, "  No services updated")?;
            }
            return Ok(());
        }

        let patch = summary.patch.len();
        let review = summary.major_minor.len();
        if self.color {
            writeln!(
                writer,
                "  {} service(s) updated ({} patch, {} for review)",
                updates.to_string().green(),
                patch.to_string().green(),
                review.to_string().yellow()
            )?;
        } else {
            writeln!(
                writer,
                "  {} service(s) updated ({} patch, {} for review)",
                updates, patch, review
            )?;
        }

        if review > 0 {
            let names: Vec<&str> = summary
                .major_minor
                .iter()
                .map(|e| e.service.as_str())
                .collect();
            if self.color {
                writeln!(writer, "  {} {}", "Needs review:".yellow(), names.join(", "))?;
            } else {
                writeln!(writer, "  Needs review: {}", names.join(", "))?;
            }
        }

        Ok(())
    }
}
