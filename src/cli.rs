//! CLI argument parsing module for svcup

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Bundled service version reconciler
#[derive(Parser, Debug, Clone)]
#[command(
    name = "svcup",
    version,
    about = "Keep a manifest of bundled service versions up to date"
)]
pub struct CliArgs {
    /// Version manifest to reconcile
    #[arg(default_value = "versions.json")]
    pub manifest: PathBuf,

    /// TOML file replacing the built-in source list
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // Service filters
    /// Check only these services (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "SERVICE")]
    pub only: Vec<String>,

    /// Skip these services (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "SERVICE")]
    pub exclude: Vec<String>,

    // General options
    /// Dry run mode - report what would change without writing the manifest
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    // CI integration
    /// Append update signals to this file (GitHub Actions step output)
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub github_output: Option<PathBuf>,

    /// Token sent to the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    // Network options
    /// Timeout in seconds for upstream listings
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    pub timeout: u64,

    /// Timeout in seconds for download URL probes
    #[arg(long, default_value_t = 5, value_name = "SECS")]
    pub probe_timeout: u64,
}

impl CliArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }

    /// Whether an interactive progress spinner should be drawn
    pub fn show_progress(&self) -> bool {
        !(self.quiet || self.json || self.verbose)
    }
}
