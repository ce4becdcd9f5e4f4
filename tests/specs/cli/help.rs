// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

#![allow(clippy::unwrap_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn help_lists_commands() {
    invsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("sync"));
}

#[parameterized(
    long = { "--version" },
    short = { "-V" },
)]
fn version_flag_outputs_version(flag: &str) {
    invsync()
        .arg(flag)
        .assert()
        .success()
        .stdout(predicate::str::contains("invsync"))
        .stdout(predicate::str::is_match(r"[0-9]+\.[0-9]+\.[0-9]+").unwrap());
}

#[test]
fn missing_subcommand_fails() {
    invsync().assert().failure();
}
