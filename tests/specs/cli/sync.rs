// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync sync` against an unreachable server.

#![allow(clippy::unwrap_used)]

use super::common::*;

#[test]
fn nothing_to_sync() {
    let temp = workspace();

    invsync_in(&temp, &["sync"])
        .assert()
        .success()
        .stdout("Nothing to sync\n");
}

#[test]
fn failed_items_stay_queued() {
    let temp = workspace();
    queue_offline(&temp, "A", 1);
    queue_offline(&temp, "B", 1);

    invsync_in(&temp, &["sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced: 0 succeeded, 2 failed"))
        .stdout(predicate::str::contains("Pending ops: 2"));

    assert_eq!(queue_count(&temp), 2);
}

#[test]
fn json_report() {
    let temp = workspace();
    queue_offline(&temp, "A", 1);

    let output = invsync_in(&temp, &["sync", "-o", "json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["succeeded"], 0);
    assert_eq!(value["failed"], 1);
    assert_eq!(value["pending"], 1);
}
