//! End-to-end tests for the `montage` binary.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEROES: &str = r#"[
  {
    "id": "vask",
    "name": "Vask",
    "owners": [{"user": "gm", "privileged": true}, {"user": "alice"}],
    "items": [
      {"kind": "ancestry", "name": "Human"},
      {"kind": "perk", "name": "Determination", "tag": "determination"}
    ]
  },
  {"id": "lirien", "name": "Lirien", "owners": [{"user": "bob"}]},
  {"id": "oru", "name": "Oru"},
  {"id": "wolf", "name": "Wolf", "kind": "retainer"}
]"#;

/// A temp directory holding a heroes file and (later) the state file.
fn table() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heroes.json"), HEROES).unwrap();
    dir
}

fn montage(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("montage").unwrap();
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "off")
        .arg("--state")
        .arg(dir.path().join("state.json"));
    cmd
}

fn start(dir: &TempDir, extra: &[&str]) {
    montage(dir)
        .args(["start", "--heroes", "heroes.json", "--title", "Flight from Capital"])
        .args(extra)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// limits
// ---------------------------------------------------------------------------

#[test]
fn limits_reference_group() {
    let dir = table();
    montage(&dir)
        .args(["limits", "moderate", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success limit: 6"))
        .stdout(predicate::str::contains("Failure limit: 4"));
}

#[test]
fn limits_small_hard_group() {
    let dir = table();
    montage(&dir)
        .args(["limits", "hard", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success limit: 5"))
        .stdout(predicate::str::contains("Failure limit: 2"));
}

#[test]
fn limits_unknown_difficulty() {
    let dir = table();
    montage(&dir)
        .args(["limits", "brutal", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown difficulty"));
}

// ---------------------------------------------------------------------------
// start / status / end
// ---------------------------------------------------------------------------

#[test]
fn start_enrolls_eligible_heroes() {
    let dir = table();
    montage(&dir)
        .args(["start", "--heroes", "heroes.json", "--difficulty", "hard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vask"))
        .stdout(predicate::str::contains("Lirien"))
        .stdout(predicate::str::contains("Wolf").not())
        .stdout(predicate::str::contains("Success limit: 5 | Failure limit: 2"));
    assert!(dir.path().join("state.json").exists());
}

#[test]
fn start_with_missing_heroes_file() {
    let dir = table();
    montage(&dir)
        .args(["start", "--heroes", "nobody.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn status_without_test() {
    let dir = table();
    montage(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active montage"));
}

#[test]
fn status_shows_roster_and_queue() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flight from Capital"))
        .stdout(predicate::str::contains("Round 1/2 | Successes: 0/4 | Failures: 0/2"))
        .stdout(predicate::str::contains("No pending approvals."));

    montage(&dir)
        .args(["submit", "lirien", "test", "reason", "-n", "Reads the old map"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lirien: test (Reason) awaiting approval"));

    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reads the old map"))
        .stdout(predicate::str::contains("No pending approvals.").not());
}

#[test]
fn player_status_hides_limits() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["status", "--as-user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successes: 0 | Failures: 0"))
        .stdout(predicate::str::contains("vask may act"));

    montage(&dir)
        .args(["status", "--as-user", "gm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no hero in this montage"));
}

#[test]
fn player_status_with_visible_limits() {
    let dir = table();
    start(&dir, &["--visible"]);
    montage(&dir)
        .args(["status", "--as-user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successes: 0/4 | Failures: 0/2"));
}

#[test]
fn end_clears_state() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .arg("end")
        .assert()
        .success()
        .stdout(predicate::str::contains("without an outcome"));
    let stored = fs::read_to_string(dir.path().join("state.json")).unwrap();
    assert_eq!(stored.trim(), "null");
    montage(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active montage"));
}

// ---------------------------------------------------------------------------
// submit / approve / reject
// ---------------------------------------------------------------------------

#[test]
fn submit_without_test() {
    let dir = table();
    montage(&dir)
        .args(["submit", "Vask", "ability"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active montage"));
}

#[test]
fn submit_validation_failures() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["submit", "Vask", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Characteristic required"));

    montage(&dir)
        .args(["submit", "Vask", "ability"])
        .assert()
        .success();
    montage(&dir)
        .args(["submit", "Vask", "assist", "might"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already acted this round"));

    montage(&dir)
        .args(["submit", "Zebediah", "ability"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no participant matches"));
}

#[test]
fn approve_without_tier_keeps_approval() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["submit", "Oru", "test", "agility"])
        .assert()
        .success();
    montage(&dir)
        .args(["approve", "Oru"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --tier"));

    montage(&dir)
        .args(["approve", "Oru", "--tier", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failure"))
        .stdout(predicate::str::contains("Failures: 1/2"));
}

#[test]
fn approved_abstention_is_not_a_failure() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["submit", "Oru", "abstain"])
        .assert()
        .success();
    montage(&dir)
        .args(["approve", "Oru"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abstains"))
        .stdout(predicate::str::contains("failure").not())
        .stdout(predicate::str::contains("Successes: 0/4 | Failures: 0/2"));
}

#[test]
fn reject_lets_hero_choose_again() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["submit", "Vask", "test", "might"])
        .assert()
        .success();
    montage(&dir)
        .args(["reject", "vask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected"));
    montage(&dir)
        .args(["submit", "Vask", "test", "might"])
        .assert()
        .success();
}

#[test]
fn spent_characteristic_is_refused_next_round() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .args(["submit", "Vask", "test", "might"])
        .assert()
        .success();
    montage(&dir)
        .args(["approve", "Vask", "--tier", "1"])
        .assert()
        .success();
    montage(&dir).args(["abstain", "Lirien"]).assert().success();
    montage(&dir)
        .args(["abstain", "Oru"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 2/2"));

    montage(&dir)
        .args(["submit", "Vask", "test", "m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Characteristic already used this montage",
        ));
}

#[test]
fn montage_to_total_success() {
    let dir = table();
    start(&dir, &["--success-limit", "2", "--failure-limit", "2"]);

    montage(&dir)
        .args(["submit", "Vask", "ability", "-n", "Rallies the refugees"])
        .assert()
        .success();
    montage(&dir)
        .args(["approve", "Vask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("success"));

    montage(&dir)
        .args(["submit", "Lirein", "test", "presence"])
        .assert()
        .success();
    montage(&dir)
        .args(["approve", "Lirien", "--tier", "3"])
        .assert()
        .success();

    montage(&dir)
        .args(["abstain", "Oru"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Success"))
        .stdout(predicate::str::contains("Successes: 2 | Failures: 0"))
        .stdout(predicate::str::contains("The heroes earn 1 Victory."));

    montage(&dir)
        .arg("end")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Success"));
}

// ---------------------------------------------------------------------------
// relay
// ---------------------------------------------------------------------------

#[test]
fn relay_applies_messages_in_order() {
    let dir = table();
    start(&dir, &[]);
    fs::write(
        dir.path().join("intents.ndjson"),
        r#"{"type":"submitIntent","actorId":"vask","actionType":"test","characteristic":"might"}
{"type":"submitIntent","actorId":"vask","actionType":"ability"}
not json at all
{"type":"submitIntent","actorId":"oru","actionType":"abstain"}
"#,
    )
    .unwrap();

    montage(&dir)
        .args(["relay", "--file", "intents.ndjson"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vask: accepted"))
        .stdout(predicate::str::contains("vask: Already acted this round"))
        .stdout(predicate::str::contains("line 3: skipped malformed message"))
        .stdout(predicate::str::contains("oru: accepted (abstains)"));
}

#[test]
fn relay_from_stdin() {
    let dir = table();
    start(&dir, &[]);
    montage(&dir)
        .arg("relay")
        .write_stdin(
            r#"{"type":"submitIntent","actorId":"lirien","actionType":"assist"}"#.to_string() + "\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("lirien: Characteristic required"));
}
