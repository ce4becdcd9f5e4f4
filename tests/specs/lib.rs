// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs for the `invsync` binary.
//!
//! The specs live under `cli/` and are compiled as the `spec_cli` test of the
//! `invsync` package, so `assert_cmd` can locate the binary.
