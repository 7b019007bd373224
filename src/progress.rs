//! Progress display while services are reconciled
//!
//! Provides visual feedback during a run using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a reconciliation run
pub struct Progress {
    /// Whether progress display is enabled (disabled in quiet/json/verbose mode)
    enabled: bool,
    /// Current spinner
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner for one service, replacing any previous one
    pub fn service(&mut self, service: &str, position: usize, total: usize) {
        if !self.enabled {
            return;
        }
        self.finish_and_clear();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} [{prefix}] {msg}")
                .expect("Invalid template"),
        );
        spinner.set_prefix(format!("{}/{}", position, total));
        spinner.set_message(format!("Checking {}...", service));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Finish and clear the current spinner
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }
}
