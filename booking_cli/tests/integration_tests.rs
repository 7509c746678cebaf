//! Integration tests for the booksync binary.
//!
//! These tests verify end-to-end behavior that does not need a live
//! scheduling service:
//! - Config and input validation
//! - Fatal errors exit non-zero before any row is processed
//! - Log sinks are created from the config

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FEED: &str = "\
name,email,phone,service,provider,start
Alice,a@x.com,555,Haircut,Dr. Smith,2024-01-01 10:00:00
Bob,b@x.com,,Massage,Dr. Jones,2024-01-02 11:30:00
";

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("booksync"))
}

/// Write a config pointing at an API nobody listens on
fn write_config(dir: &Path, extra_files: &str) -> PathBuf {
    let input = dir.join("bookings.csv");
    let config = format!(
        r#"
[account]
user = "admin@example.com"
password = "secret"
domain = "acme.secure.simplybook.it"
api_base = "http://127.0.0.1:1/admin"

[files]
import_csv = {:?}
{}

[http]
timeout_secs = 2
"#,
        input, extra_files
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).expect("Failed to write config");
    path
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Import bookings from a CSV feed",
        ));
}

#[test]
fn test_check_reports_row_count() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path(), "");
    fs::write(temp_dir.path().join("bookings.csv"), FEED).unwrap();

    cli()
        .arg("check")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("company acme"))
        .stdout(predicate::str::contains("2 rows"));
}

#[test]
fn test_check_input_override() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path(), "");
    let other = temp_dir.path().join("other.csv");
    fs::write(&other, "name,email,phone,service,provider,start\n").unwrap();

    cli()
        .arg("check")
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 rows"));
}

#[test]
fn test_check_rejects_missing_columns() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path(), "");
    fs::write(
        temp_dir.path().join("bookings.csv"),
        "name,email,service\nAlice,a@x.com,Haircut\n",
    )
    .unwrap();

    cli()
        .arg("check")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing column"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("check")
        .arg("--config")
        .arg(temp_dir.path().join("nope.toml"))
        .assert()
        .failure();
}

#[test]
fn test_invalid_domain_fails_validation() {
    let temp_dir = setup_test_dir();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[account]
user = "admin"
password = "secret"
domain = "localhost"

[files]
import_csv = "bookings.csv"
"#,
    )
    .unwrap();

    cli()
        .arg("check")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config"));
}

#[test]
fn test_run_with_missing_input_fails_before_auth() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path(), "");

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input"));
}

#[test]
fn test_unreachable_service_is_fatal_and_logged() {
    let temp_dir = setup_test_dir();
    let debug_log = temp_dir.path().join("logs").join("debug.log");
    let failed_log = temp_dir.path().join("logs").join("failed.log");
    let rejects = temp_dir.path().join("rejects.csv");
    let files = format!(
        "debug_log = {:?}\nfailed_bookings_log = {:?}\nrejects_csv = {:?}",
        debug_log, failed_log, rejects
    );
    let config = write_config(temp_dir.path(), &files);
    fs::write(temp_dir.path().join("bookings.csv"), FEED).unwrap();

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Http"));

    assert!(debug_log.exists());
    let failed = fs::read_to_string(&failed_log).expect("Failed to read failed log");
    assert!(failed.contains("Import aborted"));
    // Nothing was processed, so no rejects file is written
    assert!(!rejects.exists());
}

#[test]
fn test_dry_run_against_unreachable_service_fails() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path(), "");
    fs::write(temp_dir.path().join("bookings.csv"), FEED).unwrap();

    cli()
        .arg("run")
        .arg("--dry-run")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
