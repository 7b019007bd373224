//! svcup - bundled service version reconciler
//!
//! Keeps the version manifest of the bundled services (nginx, MariaDB, PHP,
//! phpMyAdmin) in step with their upstream releases.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use svcup::ci;
use svcup::cli::CliArgs;
use svcup::manifest::ManifestStore;
use svcup::orchestrator::Orchestrator;
use svcup::output::{create_formatter, OutputConfig};
use svcup::progress::Progress;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the flag-derived level
fn init_tracing(args: &CliArgs) {
    let default_level = if args.quiet {
        "error"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("svcup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Manifest: {}", args.manifest.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::from_args(&args)?;
    if args.verbose {
        eprintln!("Services: {}", orchestrator.services().join(", "));
    }
    let store = ManifestStore::new(&args.manifest);
    let mut progress = Progress::new(args.show_progress());

    let report = orchestrator
        .reconcile_file(&store, args.dry_run, &mut progress)
        .await?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if let Some(path) = &args.github_output {
        ci::append_signals(path, &report.summary)
            .with_context(|| format!("failed to write CI outputs to {}", path.display()))?;
    }

    // per-service failures are reported above and do not fail the run
    Ok(ExitCode::SUCCESS)
}
