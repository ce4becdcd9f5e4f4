// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod queue;
pub mod scan;
pub mod status;
pub mod sync;
pub mod watch;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hub::{AuthProvider, ConnectionManager, EventBus, TokenStore, WebSocketTransport};
use crate::sync::{HttpSubmitter, NetworkMonitor, OfflineQueue, SyncCoordinator};

/// Everything a command needs, built from the effective configuration.
pub struct Context {
    pub config: Config,
    pub auth: Arc<TokenStore>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let auth = Arc::new(TokenStore::new(config.token.clone()));
        Context { config, auth }
    }

    /// Fail early when no credential is configured.
    pub fn require_auth(&self) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    /// A hub connection manager with the configured groups registered.
    pub async fn connection(&self) -> Result<ConnectionManager> {
        let hub = ConnectionManager::new(
            self.config.connection_config(),
            Arc::new(WebSocketTransport::new()),
            self.auth.clone(),
            EventBus::new(),
        );
        for group in &self.config.groups {
            // Disconnected, so this only records the membership.
            hub.join_group(group).await?;
        }
        Ok(hub)
    }

    pub fn open_queue(&self) -> Result<Arc<OfflineQueue>> {
        Ok(Arc::new(OfflineQueue::open(&self.config.queue_path)?))
    }

    /// A coordinator over the configured queue and REST endpoint.
    pub fn coordinator(&self, online: bool) -> Result<SyncCoordinator> {
        let submitter = HttpSubmitter::new(
            &self.config.api_url,
            self.config.submit_timeout(),
            self.auth.clone(),
        )?;
        Ok(SyncCoordinator::new(
            self.open_queue()?,
            Arc::new(submitter),
            NetworkMonitor::new(online),
        ))
    }
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
