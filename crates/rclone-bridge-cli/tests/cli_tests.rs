//! CLI integration tests for rclone-bridge.
//!
//! These tests verify command-line argument parsing, help output, and exit
//! codes for error conditions that need no rclone binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the rclone-bridge binary.
fn cmd() -> Command {
    Command::cargo_bin("rclone-bridge").unwrap()
}

/// Write a config whose disks exist but whose binary never will.
fn config_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
binary_path: /nonexistent/rclone
timeout: 5
disks:
  src:
    driver: local
    root: /tmp/src
  dst:
    driver: local
    root: /tmp/dst
"#
    )
    .unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("copy"))
        .stdout(predicate::str::contains("move"));
}

#[test]
fn test_sync_subcommand_help() {
    cmd()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--progress"))
        .stdout(predicate::str::contains("--transfers"))
        .stdout(predicate::str::contains("--checkers"))
        .stdout(predicate::str::contains("--retries"))
        .stdout(predicate::str::contains("--stat-interval"))
        .stdout(predicate::str::contains("--option"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rclone-bridge"));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/rclone.yaml", "sync", "a:/x", "b:/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_remote_argument_fails() {
    let config = config_file();
    cmd()
        .args(["--config"])
        .arg(config.path())
        .args(["sync", "no-colon-here", "dst:/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected disk:path"));
}

#[test]
fn test_out_of_bounds_transfers_flag_fails() {
    let config = config_file();
    cmd()
        .args(["--config"])
        .arg(config.path())
        .args(["sync", "src:/x", "dst:/y", "--transfers", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transfers"));
}

#[test]
fn test_invalid_verbosity_fails() {
    let config = config_file();
    cmd()
        .args(["--config"])
        .arg(config.path())
        .args(["--verbosity", "==", "sync", "src:/x", "dst:/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("verbosity"));
}

#[test]
fn test_invalid_log_format_fails() {
    let config = config_file();
    cmd()
        .args(["--config"])
        .arg(config.path())
        .args(["--log-format", "xml", "sync", "src:/x", "dst:/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log format"));
}

#[test]
fn test_unspawnable_binary_reports_io_error() {
    // Configuration and command assembly succeed; only the spawn fails.
    let config = config_file();
    cmd()
        .args(["--config"])
        .arg(config.path())
        .args(["sync", "src:/x", "dst:/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_subcommand_fails() {
    cmd().assert().failure();
}
