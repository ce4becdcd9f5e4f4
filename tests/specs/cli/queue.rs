// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync queue`.

#![allow(clippy::unwrap_used)]

use super::common::*;

#[test]
fn empty_queue() {
    let temp = workspace();

    invsync_in(&temp, &["queue", "list"])
        .assert()
        .success()
        .stdout("No queued operations\n");
    invsync_in(&temp, &["queue", "count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn list_shows_summary_lines() {
    let temp = workspace();
    queue_offline(&temp, "SKU-7", 4);

    invsync_in(&temp, &["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^\S+  \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}  in 4 SKU-7$").unwrap());
}

#[test]
fn queue_survives_between_runs() {
    let temp = workspace();
    queue_offline(&temp, "A", 1);
    queue_offline(&temp, "B", 1);

    assert_eq!(queue_count(&temp), 2);
    assert!(temp.path().join(".invsync/offline_queue.jsonl").exists());
}
