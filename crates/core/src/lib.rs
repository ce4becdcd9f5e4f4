// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! invsync-core: Shared library for the invsync inventory client
//!
//! This crate provides the hub wire protocol, the typed inbound events, and
//! the offline operation model used by the invsync client library and CLI.

pub mod error;
pub mod events;
pub mod op;
pub mod protocol;

pub use error::{Error, Result};
pub use events::{HubEvent, LiveMetrics, Product, ScanTransaction};
pub use op::{OpId, QueuedOperation, ScanSubmission, TransactionType};
pub use protocol::{ClientMessage, ServerMessage};
