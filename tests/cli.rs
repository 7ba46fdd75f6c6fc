#![cfg(target_os = "linux")]
// `Command::cargo_bin` is deprecated in newer assert_cmd releases but remains the stable API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const GRIMOIRE: &str = r#"
[spells.hello]
type = "script"
command = "echo hello-from-spell"
show_output = true
description = "Say hello"

[spells.docs]
type = "url"
command = "example.com"

[spells.broken]
type = "teleport"
command = "nowhere"
"#;

/// A sandbox with its own config dir and a grimoire file.
fn sandbox() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let grimoire = dir.path().join("grimoire.toml");
    fs::write(&grimoire, GRIMOIRE).unwrap();
    (dir, grimoire)
}

fn spellcast(dir: &TempDir, grimoire: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("spellcast").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("NO_COLOR", "1")
        .arg("--grimoire")
        .arg(grimoire);
    cmd
}

#[test]
fn list_shows_every_spell() {
    let (dir, grimoire) = sandbox();
    spellcast(&dir, &grimoire)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("Say hello"))
        .stdout(predicate::str::contains("Open URL: example.com"))
        .stdout(predicate::str::contains("unknown action type"));
}

#[test]
fn list_json_is_machine_readable() {
    let (dir, grimoire) = sandbox();
    let output = spellcast(&dir, &grimoire)
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, vec!["broken", "docs", "hello"]);
}

#[test]
fn describe_prints_the_label() {
    let (dir, grimoire) = sandbox();
    spellcast(&dir, &grimoire)
        .args(["describe", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Say hello"));
}

#[test]
fn run_reports_script_output() {
    let (dir, grimoire) = sandbox();
    spellcast(&dir, &grimoire)
        .args(["run", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Say hello"))
        .stderr(predicate::str::contains("hello-from-spell"));
}

#[test]
fn spell_name_alone_is_a_run_shortcut() {
    let (dir, grimoire) = sandbox();
    spellcast(&dir, &grimoire)
        .arg("hello")
        .assert()
        .success()
        .stderr(predicate::str::contains("hello-from-spell"));
}

#[test]
fn unknown_spell_fails_with_configuration_error() {
    let (dir, grimoire) = sandbox();
    spellcast(&dir, &grimoire)
        .args(["run", "missing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("Available spells"));
}

#[test]
fn missing_grimoire_is_reported() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");
    spellcast(&dir, &absent)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Grimoire not found"));
}
