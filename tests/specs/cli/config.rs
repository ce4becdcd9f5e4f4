// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration resolution.

#![allow(clippy::unwrap_used)]

use super::common::*;

#[test]
fn runs_without_a_config_file() {
    let temp = TempDir::new().unwrap();

    invsync()
        .args(["queue", "count"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn explicit_config_must_exist() {
    let temp = TempDir::new().unwrap();

    invsync()
        .args(["queue", "count", "--config", "absent.toml"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: cannot read config"));
}

#[test]
fn config_env_var_names_the_file() {
    let temp = TempDir::new().unwrap();

    invsync()
        .args(["queue", "count"])
        .env("INVSYNC_CONFIG", "elsewhere.toml")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("elsewhere.toml"));
}

#[test]
fn invalid_hub_url_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("invsync.toml"),
        "hub_url = \"http://localhost/hubs/inventory\"\n",
    )
    .unwrap();

    invsync()
        .args(["queue", "count"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with ws:// or wss://"));
}

#[test]
fn queue_path_follows_config() {
    let temp = workspace();
    let config = format!("queue_path = \"data/q.jsonl\"\n{}", UNREACHABLE_CONFIG);
    std::fs::write(temp.path().join("custom.toml"), config).unwrap();

    invsync_in(&temp, &["scan", "SKU-1", "--offline", "--config", "custom.toml"])
        .assert()
        .success();

    assert!(temp.path().join("data/q.jsonl").exists());
}

#[test]
fn queue_path_env_overrides_file() {
    let temp = workspace();

    invsync_in(&temp, &["scan", "SKU-1", "--offline"])
        .env("INVSYNC_QUEUE_PATH", "env-queue.jsonl")
        .assert()
        .success();

    assert!(temp.path().join("env-queue.jsonl").exists());
    assert_eq!(queue_count(&temp), 0);
}
