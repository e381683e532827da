//! Tests for error handling, suggestions and exit codes.

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn stratum(home: &TempDir) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("stratum");
    cmd.current_dir(home.path())
        .env("NO_COLOR", "1")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("RUST_LOG");
    cmd
}

fn initialised(home: &TempDir) -> String {
    let dir = home.path().join("app");
    stratum(home)
        .args(["--dir", dir.to_str().unwrap(), "init"])
        .assert()
        .success();
    dir.to_str().unwrap().to_owned()
}

#[test]
fn test_create_outside_project_is_not_found() {
    let home = TempDir::new().unwrap();
    stratum(&home)
        .args(["create", "api", "--version", "v1", "--kind", "CronJob"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No project file"))
        .stderr(predicate::str::contains("stratum init"));
}

#[test]
fn test_unknown_plugin_is_not_found() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("app");
    stratum(&home)
        .args(["--dir", dir.to_str().unwrap(), "init", "--plugins", "nope"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("nope"));
    assert!(!dir.join("PROJECT").exists());
}

#[test]
fn test_unknown_plugin_flag_is_rejected() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("app");
    stratum(&home)
        .args(["--dir", dir.to_str().unwrap(), "init", "--", "--bogus"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_unsupported_project_version() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("app");
    stratum(&home)
        .args(["--dir", dir.to_str().unwrap(), "init", "--project-version", "2"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_resource_is_user_error() {
    let home = TempDir::new().unwrap();
    let dir = initialised(&home);
    stratum(&home)
        .args(["--dir", &dir, "create", "api"])
        .args(["--group", "batch", "--version", "1", "--kind", "cronJob"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid resource"));
}

#[test]
fn test_webhook_without_type_names_phase() {
    let home = TempDir::new().unwrap();
    let dir = initialised(&home);
    stratum(&home)
        .args(["--dir", &dir, "create", "api"])
        .args(["--group", "batch", "--version", "v1", "--kind", "CronJob"])
        .assert()
        .success();

    stratum(&home)
        .args(["--dir", &dir, "create", "webhook"])
        .args(["--group", "batch", "--version", "v1", "--kind", "CronJob"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("phase: inject-resource"))
        .stderr(predicate::str::contains("plugin: manifests.stratum.dev/v1"));
}

#[test]
fn test_missing_config_file_is_configuration_error() {
    let home = TempDir::new().unwrap();
    stratum(&home)
        .args(["--config", "/no/such/stratum.toml", "list"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_invalid_arguments_exit_two() {
    let home = TempDir::new().unwrap();
    stratum(&home)
        .args(["create", "api", "--kind", "CronJob"])
        .assert()
        .failure()
        .code(2);
}
