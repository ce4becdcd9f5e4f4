// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first submission of scan operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SyncCoordinator │────►│  Submitter  │────►│  REST API   │
//! │  (single drain) │◄────│   (trait)   │◄────│             │
//! └─────────────────┘     └─────────────┘     └─────────────┘
//!        │      ▲
//!        ▼      │ offline → online
//! ┌─────────────┐ ┌────────────────┐
//! │OfflineQueue │ │ NetworkMonitor │
//! │  (JSONL)    │ └────────────────┘
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Immediate submission with fallback to the offline queue
//! - Durable JSONL queue, fsynced on every write
//! - At most one drain at a time; failures stay queued for the next pass
//! - Automatic drain when connectivity returns
//! - Idempotency key on every submission
//! - Injectable submitter trait for testing

mod coordinator;
mod network;
mod queue;
mod submit;

pub use coordinator::{
    DrainOutcome, DrainReport, SubmitOutcome, SyncCoordinator, SyncError, SyncResult,
    QUEUE_CHANGED_EVENT,
};
pub use network::NetworkMonitor;
pub use queue::{JsonlStore, MemoryStore, OfflineQueue, QueueError, QueueResult, QueueStore};
pub use submit::{
    HttpSubmitter, SubmitError, SubmitFuture, SubmitResult, Submitter, IDEMPOTENCY_HEADER,
    SCANS_PATH,
};

#[cfg(test)]
mod test_helpers;


#[cfg(test)]
mod network_tests;
