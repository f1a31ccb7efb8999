//! CLI surface smoke tests.
//!
//! These exercise argument parsing and help output only; nothing here
//! touches the network or the installed binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_self_update() {
    Command::cargo_bin("skiff")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("self-update"));
}

#[test]
fn self_update_help_documents_modes() {
    Command::cargo_bin("skiff")
        .unwrap()
        .args(["self-update", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--select"))
        .stdout(predicate::str::contains("--check"))
        .stdout(predicate::str::contains("--status"));
}

#[test]
fn version_flag_prints_crate_version() {
    Command::cargo_bin("skiff")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn conflicting_flags_are_rejected() {
    Command::cargo_bin("skiff")
        .unwrap()
        .args(["self-update", "--select", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
