// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the offline queue against the server.
//!
//! The coordinator is either idle or draining. A drain walks the queue once
//! in FIFO order, removing each operation as soon as the server acknowledges
//! it and leaving failures in place for the next trigger. A trigger that
//! arrives mid-drain is ignored rather than deferred.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use invsync_core::{OpId, QueuedOperation};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use super::network::NetworkMonitor;
use super::queue::{OfflineQueue, QueueError};
use super::submit::{SubmitError, Submitter};
use crate::hub::{EventBus, ListenerHandle};

/// Local event emitted on the bus with the pending count after every change.
pub const QUEUE_CHANGED_EVENT: &str = "queueChanged";

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The queue could not be read or written.
    #[error("offline queue: {0}")]
    Queue(#[from] QueueError),

    /// The server rejected an immediate submission.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Per-pass accounting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// What a call to [`SyncCoordinator::drain`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Another drain was in progress; nothing was processed.
    AlreadyDraining,
    /// The client is offline.
    Offline,
    /// Nothing was queued.
    Empty,
    /// A full pass ran.
    Completed(DrainReport),
}

impl DrainOutcome {
    /// The pass report, zero when the drain was skipped.
    pub fn report(&self) -> DrainReport {
        match self {
            DrainOutcome::Completed(report) => *report,
            _ => DrainReport::default(),
        }
    }
}

/// What happened to an operation handed to [`SyncCoordinator::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The server accepted it; carries the server's reply.
    Sent(Value),
    /// It was persisted for a later drain.
    Queued(OpId),
}

struct Shared {
    queue: Arc<OfflineQueue>,
    submitter: Arc<dyn Submitter>,
    network: NetworkMonitor,
    draining: AtomicBool,
}

/// Clears the draining flag when the pass ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-drain coordinator over an [`OfflineQueue`].
///
/// Cloning is cheap; clones share the draining flag.
#[derive(Clone)]
pub struct SyncCoordinator {
    shared: Arc<Shared>,
}

impl SyncCoordinator {
    pub fn new(
        queue: Arc<OfflineQueue>,
        submitter: Arc<dyn Submitter>,
        network: NetworkMonitor,
    ) -> Self {
        SyncCoordinator {
            shared: Arc::new(Shared {
                queue,
                submitter,
                network,
                draining: AtomicBool::new(false),
            }),
        }
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.shared.queue
    }

    pub fn network(&self) -> &NetworkMonitor {
        &self.shared.network
    }

    pub fn is_draining(&self) -> bool {
        self.shared.draining.load(Ordering::Acquire)
    }

    /// Number of operations waiting to be synced.
    pub fn pending_count(&self) -> SyncResult<usize> {
        Ok(self.shared.queue.count()?)
    }

    /// Emit [`QUEUE_CHANGED_EVENT`] on `bus` whenever the queue changes.
    pub fn publish_queue_changes(&self, bus: &EventBus) -> ListenerHandle<usize> {
        let bus = bus.clone();
        self.shared.queue.on_change(move |count| {
            bus.emit(QUEUE_CHANGED_EVENT, &[json!(count)]);
        })
    }

    /// Submit `payload` now, or queue it if the server is unreachable.
    ///
    /// Business rejections and authorization failures are returned as
    /// errors and nothing is queued.
    pub async fn submit(&self, payload: Value) -> SyncResult<SubmitOutcome> {
        let op = QueuedOperation::new(payload);

        if !self.shared.network.is_online() {
            tracing::debug!(id = %op.id, "offline, queueing operation");
            return Ok(SubmitOutcome::Queued(self.shared.queue.enqueue_op(op)?));
        }

        match self.shared.submitter.submit(&op.id, &op.payload).await {
            Ok(reply) => Ok(SubmitOutcome::Sent(reply)),
            Err(e) if e.is_connectivity() => {
                tracing::warn!(id = %op.id, error = %e, "submission failed, queueing for sync");
                Ok(SubmitOutcome::Queued(self.shared.queue.enqueue_op(op)?))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Make one pass over the queue.
    ///
    /// A storage failure while removing an acknowledged operation ends the
    /// pass with an error; everything after it stays queued.
    pub async fn drain(&self) -> SyncResult<DrainOutcome> {
        if self
            .shared
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("drain already in progress");
            return Ok(DrainOutcome::AlreadyDraining);
        }
        let _guard = DrainGuard(&self.shared.draining);

        if !self.shared.network.is_online() {
            tracing::debug!("offline, skipping drain");
            return Ok(DrainOutcome::Offline);
        }

        let ops = self.shared.queue.list()?;
        if ops.is_empty() {
            return Ok(DrainOutcome::Empty);
        }

        tracing::info!(pending = ops.len(), "draining offline queue");
        let mut report = DrainReport::default();
        for op in ops {
            match self.shared.submitter.submit(&op.id, &op.payload).await {
                Ok(_) => {
                    self.shared.queue.remove(&op.id)?;
                    report.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(id = %op.id, error = %e, "queued operation failed to sync");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "drain complete"
        );
        Ok(DrainOutcome::Completed(report))
    }

    /// Drain on every offline→online transition until the task is aborted.
    pub fn spawn_auto_sync(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        let mut rx = self.shared.network.subscribe();
        tokio::spawn(async move {
            let mut online = *rx.borrow_and_update();
            while rx.changed().await.is_ok() {
                let now = *rx.borrow_and_update();
                if now && !online {
                    match coordinator.drain().await {
                        Ok(outcome) => tracing::debug!(?outcome, "auto-sync finished"),
                        Err(e) => tracing::error!(error = %e, "auto-sync failed"),
                    }
                }
                online = now;
            }
        })
    }
}
