//! End-to-end tests for the svcup CLI
//!
//! These tests verify:
//! - A full run against a mock upstream rewrites the manifest
//! - CI outputs carry the update flags and the summary
//! - Dry-run mode leaves files unchanged
//! - Exit codes for fatal errors and partial failures

use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "nginx": {
    "version": "1.27.4",
    "downloadUrl": "https://nginx.org/download/nginx-1.27.4.zip"
  },
  "mariadb": {
    "version": "11.4.2",
    "downloadUrl": "https://archive.mariadb.org/mariadb-11.4.2/winx64-packages/mariadb-11.4.2-winx64.zip"
  },
  "phpmyadmin": {
    "version": "5.1.4",
    "downloadUrl": "https://files.phpmyadmin.net/phpMyAdmin/5.1.4/phpMyAdmin-5.1.4-all-languages.zip"
  }
}
"#;

/// Get a Command for the svcup binary with CI variables cleared and colors off
fn svcup_cmd() -> Command {
    let mut cmd = Command::cargo_bin("svcup").expect("Failed to find svcup binary");
    cmd.env_remove("GITHUB_OUTPUT")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .env_remove("CLICOLOR_FORCE")
        .env("NO_COLOR", "1");
    cmd
}

/// Create a project directory with a manifest and a sources file pointing at the mock
fn create_project(server: &ServerGuard) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let manifest = temp_dir.path().join("versions.json");
    fs::write(&manifest, MANIFEST).unwrap();

    let config = temp_dir.path().join("sources.toml");
    fs::write(
        &config,
        format!(
            r#"
[[source]]
service = "nginx"
tag_pattern = '^release-(\d+)\.(\d+)\.(\d+)$'
download_url = "{base}/download/nginx-{{version}}.zip"

[source.listing]
kind = "github-tags"
repo = "nginx/nginx"
api_base = "{base}"

[[source]]
service = "mariadb"
tag_pattern = '^mariadb-(\d+)\.(\d+)\.(\d+)$'
download_url = "{base}/mariadb/mariadb-{{version}}-winx64.zip"

[source.listing]
kind = "github-tags"
repo = "MariaDB/server"
api_base = "{base}"

[[source]]
service = "phpmyadmin"
tag_pattern = '^RELEASE_(\d+)_(\d+)_(\d+)$'
download_url = "{base}/phpMyAdmin/{{version}}/phpMyAdmin-{{version}}-all-languages.zip"

[source.listing]
kind = "github-tags"
repo = "phpmyadmin/phpmyadmin"
api_base = "{base}"
"#,
            base = server.url()
        ),
    )
    .unwrap();

    (temp_dir, manifest, config)
}

/// nginx has a patch release, MariaDB's API is down, phpMyAdmin has a minor release
fn mock_upstream(server: &mut ServerGuard) {
    server
        .mock("GET", Matcher::Regex(r"^/repos/nginx/nginx/tags".to_string()))
        .with_status(200)
        .with_body(r#"[{"name": "release-1.27.5"}, {"name": "release-1.27.4"}]"#)
        .create();
    server
        .mock("HEAD", "/download/nginx-1.27.5.zip")
        .with_status(200)
        .create();
    server
        .mock("GET", Matcher::Regex(r"^/repos/MariaDB/server/tags".to_string()))
        .with_status(502)
        .create();
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/repos/phpmyadmin/phpmyadmin/tags".to_string()),
        )
        .with_status(200)
        .with_body(r#"[{"name": "RELEASE_5_2_0RC1"}, {"name": "RELEASE_5_2_0"}, {"name": "STABLE"}]"#)
        .create();
    server
        .mock("HEAD", "/phpMyAdmin/5.2.0/phpMyAdmin-5.2.0-all-languages.zip")
        .with_status(200)
        .create();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_full_run_updates_manifest_and_ci_outputs() {
    let mut server = Server::new();
    mock_upstream(&mut server);
    let (dir, manifest, config) = create_project(&server);
    let github_output = dir.path().join("github_output");

    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .arg("--github-output")
        .arg(&github_output)
        .assert()
        .success()
        .stdout(predicate::str::contains("nginx"))
        .stdout(predicate::str::contains("1.27.5"))
        .stdout(predicate::str::contains("error"))
        .stdout(predicate::str::contains("Needs review: phpmyadmin"));

    let json = read_json(&manifest);
    assert_eq!(json["nginx"]["version"], "1.27.5");
    assert_eq!(
        json["nginx"]["downloadUrl"],
        format!("{}/download/nginx-1.27.5.zip", server.url())
    );
    assert_eq!(json["mariadb"]["version"], "11.4.2");
    assert_eq!(json["phpmyadmin"]["version"], "5.2.0");

    let outputs = fs::read_to_string(&github_output).unwrap();
    assert!(outputs.contains("has_patch_updates=true\n"));
    assert!(outputs.contains("has_major_minor_updates=true\n"));
    assert!(outputs.contains("update_summary<<SVCUP_EOF\n"));
    assert!(outputs.contains(r#""service":"phpmyadmin","from":"5.1.4","to":"5.2.0","type":"minor""#));
    assert!(!outputs.contains("mariadb"));
}

#[test]
fn test_github_output_from_environment() {
    let mut server = Server::new();
    mock_upstream(&mut server);
    let (dir, manifest, config) = create_project(&server);
    let github_output = dir.path().join("github_output");

    svcup_cmd()
        .env("GITHUB_OUTPUT", &github_output)
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .arg("--only")
        .arg("nginx")
        .assert()
        .success();

    let outputs = fs::read_to_string(&github_output).unwrap();
    assert!(outputs.starts_with("has_patch_updates=true\nhas_major_minor_updates=false\n"));
}

#[test]
fn test_second_run_reports_nothing() {
    let mut server = Server::new();
    mock_upstream(&mut server);
    let (dir, manifest, config) = create_project(&server);

    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let after_first = fs::read_to_string(&manifest).unwrap();

    let github_output = dir.path().join("github_output");
    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .arg("--github-output")
        .arg(&github_output)
        .assert()
        .success()
        .stdout(predicate::str::contains("No services updated"));

    assert_eq!(fs::read_to_string(&manifest).unwrap(), after_first);
    let outputs = fs::read_to_string(&github_output).unwrap();
    assert!(outputs.contains("has_patch_updates=false\n"));
    assert!(outputs.contains("has_major_minor_updates=false\n"));
}

#[test]
fn test_dry_run_json_leaves_manifest_unchanged() {
    let mut server = Server::new();
    mock_upstream(&mut server);
    let (_dir, manifest, config) = create_project(&server);

    let output = svcup_cmd()
        .arg(&manifest)
        .args(["--dry-run", "--json", "--exclude", "mariadb", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&manifest).unwrap(), MANIFEST);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["manifest_written"], false);
    assert_eq!(json["has_patch_updates"], true);
    assert_eq!(json["summary"]["patch"][0]["service"], "nginx");
    assert_eq!(json["services"].as_array().unwrap().len(), 2);
}

#[test]
fn test_quiet_output() {
    let mut server = Server::new();
    mock_upstream(&mut server);
    let (_dir, manifest, config) = create_project(&server);

    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .arg("-q")
        .assert()
        .success()
        .stdout("2 updated\n");
}

#[test]
fn test_missing_manifest_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    svcup_cmd()
        .arg(temp_dir.path().join("versions.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest file not found"));
}

#[test]
fn test_invalid_manifest_fails() {
    let server = Server::new();
    let (_dir, manifest, config) = create_project(&server);
    fs::write(&manifest, "[not, json").unwrap();

    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse JSON"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manifest = temp_dir.path().join("versions.json");
    fs::write(&manifest, MANIFEST).unwrap();
    let config = temp_dir.path().join("sources.toml");
    fs::write(
        &config,
        r#"
[[source]]
service = "nginx"
tag_pattern = '^release-(\d+)\.(\d+)\.(\d+)$'
download_url = "https://nginx.org/download/{arch}/nginx-{version}.zip"

[source.listing]
kind = "github-tags"
repo = "nginx/nginx"
"#,
    )
    .unwrap();

    svcup_cmd()
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL template"));
    assert_eq!(fs::read_to_string(&manifest).unwrap(), MANIFEST);
}

#[test]
fn test_unknown_service_filter_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manifest = temp_dir.path().join("versions.json");
    fs::write(&manifest, MANIFEST).unwrap();

    svcup_cmd()
        .arg(&manifest)
        .args(["--only", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown service 'redis'"));
}

#[test]
fn test_version_flag() {
    svcup_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
