//! Tests for the `binder` binary

use super::common::fixtures::TestEnv;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn binder(env: &TestEnv) -> Command {
    let mut cmd = Command::cargo_bin("binder").expect("binary should build");
    cmd.arg("--data-dir").arg(env.data_dir());
    cmd
}

#[test]
fn test_empty_list() {
    let env = TestEnv::new();
    env.write_config_file();

    binder(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects registered"));
}

#[test]
fn test_add_use_remove() {
    let env = TestEnv::new();
    env.write_config_file();
    env.install("20.11.0");
    let project = env.project("shop");

    binder(&env)
        .arg("add")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added shop"));

    binder(&env)
        .arg("add")
        .arg(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));

    binder(&env)
        .args(["use"])
        .arg(&project)
        .arg("20.11.0")
        .assert()
        .success()
        .stdout(predicate::str::contains("now uses v20.11.0"));
    assert_eq!(
        fs::read_to_string(project.join(".nvmdrc")).unwrap(),
        "20.11.0"
    );

    binder(&env)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"20.11.0\""));

    binder(&env)
        .arg("remove")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed shop"));

    binder(&env)
        .arg("remove")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("is not registered"));
}

#[test]
fn test_move_out_of_range_fails() {
    let env = TestEnv::new();
    env.write_config_file();

    binder(&env)
        .args(["move", "0", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_versions_lists_installed_or_names_empty_dir() {
    let env = TestEnv::new();
    env.write_config_file();

    binder(&env)
        .arg("versions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No versions installed in"));

    env.install("18.19.0");
    env.install("20.11.0");
    binder(&env)
        .args(["versions", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v20.11.0\nv18.19.0"));
}
