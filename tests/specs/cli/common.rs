// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Config pointing at ports nothing listens on.
pub const UNREACHABLE_CONFIG: &str = r#"
hub_url = "ws://127.0.0.1:1/hubs/inventory"
api_url = "http://127.0.0.1:1"
handshake_timeout_ms = 2000
submit_timeout_ms = 2000

[reconnect]
base_delay_ms = 10
max_delay_ms = 10
jitter_ms = 0
max_attempts = 1
"#;

/// The binary, isolated from the caller's environment.
pub fn invsync() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("invsync").unwrap();
    for var in [
        "INVSYNC_CONFIG",
        "INVSYNC_TOKEN",
        "INVSYNC_HUB_URL",
        "INVSYNC_API_URL",
        "INVSYNC_QUEUE_PATH",
        "RUST_LOG",
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A working directory whose `invsync.toml` points at unreachable servers.
pub fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("invsync.toml"), UNREACHABLE_CONFIG).unwrap();
    temp
}

/// Run `invsync` in `dir` with `args`.
pub fn invsync_in(dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = invsync();
    cmd.args(args).current_dir(dir.path());
    cmd
}

/// Queue a scan without touching the network.
pub fn queue_offline(dir: &TempDir, code: &str, quantity: i64) {
    invsync_in(dir, &["scan", code, "-q", &quantity.to_string(), "--offline"])
        .assert()
        .success();
}

/// Current `queue count` output.
pub fn queue_count(dir: &TempDir) -> usize {
    let output = invsync_in(dir, &["queue", "count"]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}
