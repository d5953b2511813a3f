mod common;

use common::{version_dir, TestEnv, MODEL};
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn validate_fixture_catalog() {
    let env = TestEnv::new();
    env.cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(contains("OK: modelzoo validation passed"));
}

#[test]
fn resolve_latest_prints_version_dir() {
    let env = TestEnv::new();
    let expected = version_dir(&env.root, MODEL, 2);
    env.cmd()
        .args(["resolve", MODEL])
        .assert()
        .success()
        .stdout(contains(expected.display().to_string()));
}

#[test]
fn resolve_artifact_path() {
    let env = TestEnv::new();
    env.cmd()
        .args(["resolve", MODEL, "--version", "1", "--artifact"])
        .assert()
        .success()
        .stdout(contains("v1").and(contains("model.pkl")));
}

#[test]
fn show_prints_metadata_yaml() {
    let env = TestEnv::new();
    env.cmd()
        .args(["show", MODEL, "--version", "1"])
        .assert()
        .success()
        .stdout(contains("model_name: uc_power_model").and(contains("run-1")));
}

#[test]
fn list_marks_latest() {
    let env = TestEnv::new();
    env.cmd()
        .args(["list", MODEL])
        .assert()
        .success()
        .stdout(contains("v1\n").and(contains("v2\tlatest")));

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("uc_power_model\tv2\tv1,v2"));
}

#[test]
fn unknown_model_fails_on_stderr() {
    let env = TestEnv::new();
    env.cmd()
        .args(["resolve", "missing_model"])
        .assert()
        .failure()
        .stderr(contains("error: model not found: missing_model"));
}
