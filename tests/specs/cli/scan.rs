// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync scan` against an unreachable server.

#![allow(clippy::unwrap_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn unreachable_server_queues_the_scan() {
    let temp = workspace();

    invsync_in(&temp, &["scan", "SKU-1042", "-q", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued in 3 SKU-1042"))
        .stdout(predicate::str::contains("server unreachable"))
        .stdout(predicate::str::contains("Pending ops: 1"));

    assert_eq!(queue_count(&temp), 1);
}

#[test]
fn offline_flag_skips_the_server() {
    let temp = workspace();

    invsync_in(&temp, &["scan", "SKU-1", "--offline", "-t", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued out 1 SKU-1"))
        .stdout(predicate::str::contains("(offline)"));
}

#[test]
fn queued_scans_accumulate_in_order() {
    let temp = workspace();
    queue_offline(&temp, "A", 1);
    queue_offline(&temp, "B", 2);
    queue_offline(&temp, "C", 3);

    let output = invsync_in(&temp, &["queue", "list", "-o", "json"])
        .output()
        .unwrap();
    let ops: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = ops
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["payload"]["productCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["A", "B", "C"]);
}

#[test]
fn json_output_reports_queued_id() {
    let temp = workspace();

    let output = invsync_in(&temp, &["scan", "SKU-1", "--offline", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "queued");
    assert_eq!(value["pending"], 1);
    assert!(value["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn payload_carries_submitter_and_note() {
    let temp = workspace();
    invsync_in(
        &temp,
        &["scan", "SKU-1", "--offline", "--by", "ana", "--note", "damaged box"],
    )
    .assert()
    .success();

    let output = invsync_in(&temp, &["queue", "list", "-o", "json"])
        .output()
        .unwrap();
    let ops: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ops[0]["payload"]["submittedBy"], "ana");
    assert_eq!(ops[0]["payload"]["note"], "damaged box");
    assert_eq!(ops[0]["payload"]["transactionType"], "in");
}

#[parameterized(
    blank_code = { &["scan", "  "] },
    unknown_type = { &["scan", "SKU-1", "--type", "gift"] },
)]
fn invalid_scans_are_rejected(args: &[&str]) {
    let temp = workspace();

    invsync_in(&temp, args).assert().failure();

    assert_eq!(queue_count(&temp), 0);
}
