// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Reads `name`, treating unset and blank values alike.
fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `INVSYNC_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::INVSYNC_CONFIG).map(PathBuf::from)
}

/// Returns the bearer token from `INVSYNC_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::INVSYNC_TOKEN)
}

/// Returns the value of `INVSYNC_HUB_URL` if set.
pub fn hub_url() -> Option<String> {
    non_empty(vars::INVSYNC_HUB_URL)
}

/// Returns the value of `INVSYNC_API_URL` if set.
pub fn api_url() -> Option<String> {
    non_empty(vars::INVSYNC_API_URL)
}

/// Returns the value of `INVSYNC_QUEUE_PATH` if set.
pub fn queue_path() -> Option<PathBuf> {
    non_empty(vars::INVSYNC_QUEUE_PATH).map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
