//! End-to-end CLI tests for the paper-renamer binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn renamer() -> Command {
    let mut cmd = Command::cargo_bin("paper-renamer").unwrap();
    // Keep the user's real config file out of the tests
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-paper-renamer-config")
        .env_remove("RUST_LOG");
    cmd
}

/// --help displays usage and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    renamer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Author, Year - Title.pdf"));
}

/// --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    renamer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("paper-renamer"));
}

/// Missing ROOT prints usage and exits with code 1.
#[test]
fn test_binary_missing_root_exits_one() {
    renamer()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

/// Two positional arguments are rejected with code 1.
#[test]
fn test_binary_extra_positional_exits_one() {
    renamer().args(["a", "b"]).assert().code(1);
}

/// Invalid flags exit with code 1.
#[test]
fn test_binary_invalid_flag_exits_one() {
    renamer()
        .args(["--invalid-flag", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

/// A missing root directory is a fatal error.
#[test]
fn test_binary_nonexistent_root_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    renamer()
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read root directory"));
}

/// An empty directory completes with a zero summary.
#[test]
fn test_binary_empty_directory_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    renamer()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 0 file(s)"))
        .stdout(predicate::str::contains("Total time:"));
}

/// -q suppresses the summary.
#[test]
fn test_binary_quiet_hides_summary() {
    let dir = tempfile::tempdir().unwrap();
    renamer()
        .args(["-q"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

/// A file that cannot be parsed as PDF fails alone; the run still exits 0.
#[test]
fn test_binary_per_file_failure_still_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"not a pdf").unwrap();
    renamer()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed"));
    assert!(dir.path().join("broken.pdf").exists());
}

/// An invalid explicit config file is fatal.
#[test]
fn test_binary_invalid_config_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "concurrency = 0\n").unwrap();
    renamer()
        .arg("--config")
        .arg(&config)
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("concurrency"));
}

/// Out-of-range flag values are usage errors.
#[test]
fn test_binary_concurrency_out_of_range_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    renamer()
        .args(["-c", "0"])
        .arg(dir.path())
        .assert()
        .code(1);
}

/// `verbosity = "quiet"` in the config file hides the summary like -q.
#[test]
fn test_binary_config_quiet_hides_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "verbosity = \"quiet\"\n").unwrap();
    renamer()
        .arg("--config")
        .arg(&config)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
