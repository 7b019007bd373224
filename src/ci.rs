//! CI step outputs
//!
//! Appends the two update flags and the serialized summary in the
//! `GITHUB_OUTPUT` format (`key=value` lines plus a heredoc block).

use crate::domain::UpdateSummary;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub const HAS_PATCH_UPDATES: &str = "has_patch_updates";
pub const HAS_MAJOR_MINOR_UPDATES: &str = "has_major_minor_updates";
pub const UPDATE_SUMMARY: &str = "update_summary";

/// Heredoc delimiter wrapping the summary JSON
pub const DELIMITER: &str = "SVCUP_EOF";

/// Render the signal block for a summary
pub fn render_signals(summary: &UpdateSummary) -> serde_json::Result<String> {
    let json = serde_json::to_string(summary)?;
    Ok(format!(
        "{}={}\n{}={}\n{}<<{}\n{}\n{}\n",
        HAS_PATCH_UPDATES,
        summary.has_patch_updates(),
        HAS_MAJOR_MINOR_UPDATES,
        summary.has_major_minor_updates(),
        UPDATE_SUMMARY,
        DELIMITER,
        json,
        DELIMITER
    ))
}

/// Append the signal block to a CI output file, creating it if needed
pub fn append_signals(path: &Path, summary: &UpdateSummary) -> io::Result<()> {
    let block = render_signals(summary).map_err(io::Error::other)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())?;
    file.flush()
}
