use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use piisync_core::SyncConfig;

fn piisync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("piisync"));
    cmd.env("HOME", home).env("USERPROFILE", home);
    cmd
}

#[test]
fn config_prints_compiled_in_source() {
    let home = TempDir::new().expect("home");

    piisync_cmd(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("owner: Anish-Shobith"))
        .stdout(contains("repo: public-testing"))
        .stdout(contains("path: pattern.json"))
        .stdout(contains("*/1 * * * *"))
        .stdout(contains(".piisync"));
}

#[test]
fn config_output_parses_back() {
    let home = TempDir::new().expect("home");

    let output = piisync_cmd(home.path())
        .args(["config", "--full-diff"])
        .output()
        .expect("run piisync config");
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let parsed: SyncConfig = serde_yaml::from_str(&text).expect("config yaml");
    assert!(parsed.reconcile.full_diff);
    assert_eq!(parsed.source, SyncConfig::default().source);
}

#[test]
fn config_does_not_touch_the_database() {
    let home = TempDir::new().expect("home");

    piisync_cmd(home.path()).arg("config").assert().success();

    assert!(!home.path().join(".piisync").exists());
}

#[test]
fn unknown_subcommand_is_rejected() {
    let home = TempDir::new().expect("home");

    piisync_cmd(home.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("unrecognized subcommand"));
}
