// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync status` and `invsync watch` preconditions.

use super::common::*;

#[test]
fn status_requires_a_token() {
    let temp = workspace();

    invsync_in(&temp, &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: not signed in"))
        .stderr(predicate::str::contains("INVSYNC_TOKEN"));
}

#[test]
fn watch_requires_a_token() {
    let temp = workspace();

    invsync_in(&temp, &["watch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

#[test]
fn blank_token_counts_as_signed_out() {
    let temp = workspace();

    invsync_in(&temp, &["status"])
        .env("INVSYNC_TOKEN", "   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

#[test]
fn status_reports_unreachable_hub() {
    let temp = workspace();

    invsync_in(&temp, &["status"])
        .env("INVSYNC_TOKEN", "test-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not reach the hub"));
}

#[test]
fn watch_gives_up_on_unreachable_hub() {
    let temp = workspace();

    invsync_in(&temp, &["watch"])
        .env("INVSYNC_TOKEN", "test-token")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("gave up reconnecting after 1 attempts"));
}
