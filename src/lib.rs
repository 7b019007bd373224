//! svcup - bundled service version reconciler
//!
//! Polls the upstream release listings of the bundled services (nginx,
//! MariaDB, PHP, phpMyAdmin), classifies each newer release as patch, minor or
//! major, validates its download URL and rewrites the version manifest.
//!
//! PHP is tracked as several release lines at once; every other service
//! pins a single version.

pub mod ci;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod update;
