// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! invsync - offline-first inventory client.
//!
//! This crate provides the client core used by the `invsync` CLI: a
//! real-time hub connection with automatic reconnect and group replay, an
//! event bus for server-pushed updates, and a durable offline queue of scan
//! submissions drained by a single-flight sync coordinator.
//!
//! # Main Components
//!
//! - [`hub::ConnectionManager`] - hub connection lifecycle and invocations
//! - [`hub::EventBus`] - name-keyed fan-out of inbound events
//! - [`hub::GroupMembership`] - groups replayed on every connection
//! - [`sync::OfflineQueue`] - durable FIFO of pending operations
//! - [`sync::SyncCoordinator`] - immediate submission and queue draining
//! - [`Config`] - client configuration
//!
//! ```rust,ignore
//! use invsync::hub::{ConnectionManager, EventBus, TokenStore, WebSocketTransport};
//!
//! let hub = ConnectionManager::new(
//!     config.connection_config(),
//!     Arc::new(WebSocketTransport::new()),
//!     Arc::new(TokenStore::new(config.token.clone())),
//!     EventBus::new(),
//! );
//! hub.bus().on("LowStockAlert", |args| { println!("{args:?}"); Ok(()) });
//! hub.join_group("inventory").await?;
//! hub.connect().await?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod hub;
pub mod sync;

pub use cli::{Cli, Command, OutputArgs, OutputFormat, QueueCommand};
pub use config::Config;
pub use error::{Error, Result};

use commands::scan::ScanArgs;
use commands::Context;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    let ctx = Context::new(config);

    match cli.command {
        Command::Status { output } => commands::status::run(&ctx, output.output).await,
        Command::Watch { group, output } => commands::watch::run(&ctx, group, output.output).await,
        Command::Scan {
            code,
            quantity,
            transaction_type,
            by,
            note,
            offline,
            output,
        } => {
            let args = ScanArgs {
                code,
                quantity,
                transaction_type,
                by,
                note,
                offline,
            };
            commands::scan::run(&ctx, args, output.output).await
        }
        Command::Queue(cmd) => commands::queue::run(&ctx, cmd),
        Command::Sync { output } => commands::sync::run(&ctx, output.output).await,
    }
}
