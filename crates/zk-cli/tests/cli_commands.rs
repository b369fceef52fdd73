//! Integration tests for the `zk` CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn fight_is_deterministic() {
    let run = || {
        let output = Command::cargo_bin("zk")
            .unwrap()
            .args(["fight", "--seed", "7"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(first.contains("vs"));
    assert!(first.contains("strikes first"));
}

#[test]
fn fight_reports_a_winner_or_draw() {
    let output = Command::cargo_bin("zk")
        .unwrap()
        .args(["fight", "--attack-a", "30", "--health-a", "80", "--attack-b", "1", "--health-b", "20"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("wins the fight") || stdout.contains("draw"));
}

#[test]
fn simulate_prints_summary() {
    Command::cargo_bin("zk")
        .unwrap()
        .args(["simulate", "--seed", "7", "--roster", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duel summary"))
        .stdout(predicate::str::contains("Score:"));
}

#[test]
fn simulate_emits_json_report() {
    let output = Command::cargo_bin("zk")
        .unwrap()
        .args(["simulate", "--seed", "7", "--roster", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rounds"].as_array().unwrap().len(), 2);
    assert!(report["reason"].is_string());
}
