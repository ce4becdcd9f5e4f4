// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hub group membership.
//!
//! The client keeps the set of groups it wants to belong to regardless of
//! whether it is connected. Joins issued while disconnected are deferred;
//! every new session replays one `JoinGroup` per member. A per-session
//! `joined` set keeps a group from being joined twice in the same session
//! when an explicit join races the replay.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use invsync_core::protocol::methods;
use serde_json::json;

use super::connection::{ConnectionManager, ConnectionResult};

#[derive(Default)]
struct Groups {
    members: BTreeSet<String>,
    /// Session the `joined` set belongs to.
    session: Option<u64>,
    joined: HashSet<String>,
}

impl Groups {
    /// Reset the joined set when a newer session is observed. Returns
    /// `false` for a session older than the one already tracked.
    fn observe(&mut self, session: u64) -> bool {
        match self.session {
            Some(current) if current == session => true,
            Some(current) if current > session => false,
            _ => {
                self.session = Some(session);
                self.joined.clear();
                true
            }
        }
    }
}

/// Outcome of a replay after (re)connecting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub joined: usize,
    pub failed: usize,
}

/// Set of groups the client intends to belong to.
#[derive(Default)]
pub struct GroupMembership {
    groups: Mutex<Groups>,
}

impl GroupMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current members, sorted.
    pub fn members(&self) -> Vec<String> {
        self.lock().members.iter().cloned().collect()
    }

    pub fn contains(&self, group: &str) -> bool {
        self.lock().members.contains(group)
    }

    /// Add `group`, joining it immediately when `hub` is connected.
    pub(crate) async fn join(&self, hub: &ConnectionManager, group: &str) -> ConnectionResult<()> {
        // Record intent before looking at the connection so a concurrent
        // replay either sees the member or we see its session.
        self.lock().members.insert(group.to_string());

        let Some(session) = hub.session_epoch() else {
            tracing::debug!(group, "not connected, join deferred");
            return Ok(());
        };
        if !self.claim(session, group) {
            return Ok(());
        }

        if let Err(e) = hub.invoke(methods::JOIN_GROUP, vec![json!(group)]).await {
            self.release(session, group);
            return Err(e);
        }
        tracing::debug!(group, "joined group");
        Ok(())
    }

    /// Remove `group`, leaving it immediately when `hub` is connected.
    pub(crate) async fn leave(&self, hub: &ConnectionManager, group: &str) -> ConnectionResult<()> {
        {
            let mut groups = self.lock();
            groups.members.remove(group);
            groups.joined.remove(group);
        }
        if hub.session_epoch().is_none() {
            return Ok(());
        }
        hub.invoke(methods::LEAVE_GROUP, vec![json!(group)]).await?;
        tracing::debug!(group, "left group");
        Ok(())
    }

    /// Join every member in the new session `session`.
    ///
    /// Failures are logged and skipped so one bad group does not block the
    /// rest. Members added while the replay runs are picked up too.
    pub(crate) async fn on_reconnected(&self, hub: &ConnectionManager, session: u64) -> ReplayReport {
        let mut report = ReplayReport::default();
        let mut failed: HashSet<String> = HashSet::new();

        loop {
            if hub.session_epoch() != Some(session) {
                tracing::debug!(session, "session ended, replay stopped");
                break;
            }
            let next = {
                let mut groups = self.lock();
                if !groups.observe(session) {
                    break;
                }
                let next = groups
                    .members
                    .iter()
                    .find(|g| !groups.joined.contains(*g) && !failed.contains(*g))
                    .cloned();
                if let Some(group) = &next {
                    groups.joined.insert(group.clone());
                }
                next
            };
            let Some(group) = next else { break };

            match hub.invoke(methods::JOIN_GROUP, vec![json!(group)]).await {
                Ok(_) => report.joined += 1,
                Err(e) => {
                    tracing::warn!(group = %group, error = %e, "failed to rejoin group");
                    self.release(session, &group);
                    failed.insert(group);
                    report.failed += 1;
                }
            }
        }

        if report.joined + report.failed > 0 {
            tracing::info!(joined = report.joined, failed = report.failed, "replayed group joins");
        }
        report
    }

    /// Mark `group` joined in `session`. Returns `false` if it already was
    /// or `session` is stale.
    fn claim(&self, session: u64, group: &str) -> bool {
        let mut groups = self.lock();
        groups.observe(session) && groups.joined.insert(group.to_string())
    }

    fn release(&self, session: u64, group: &str) {
        let mut groups = self.lock();
        if groups.session == Some(session) {
            groups.joined.remove(group);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Groups> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
