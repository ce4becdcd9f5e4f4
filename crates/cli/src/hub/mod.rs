// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time hub client.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ConnectionManager │────►│  Transport  │────►│     Hub     │
//! │  (state machine)  │◄────│   (trait)   │◄────│   Server    │
//! └───────────────────┘     └─────────────┘     └─────────────┘
//!    │            │
//!    ▼            ▼
//! ┌──────────┐ ┌──────────────────┐
//! │ EventBus │ │ GroupMembership  │  (replayed on every connect)
//! └──────────┘ └──────────────────┘
//! ```
//!
//! # Features
//!
//! - Single logical connection with an observable phase
//! - Automatic reconnect with exponential backoff and jitter
//! - Connect and reconnect gated on the authentication predicate
//! - Inbound events fanned out by name, with handler failures contained
//! - Injectable transport trait for testing

mod auth;
mod backoff;
mod bus;
mod connection;
mod groups;
mod transport;

pub use auth::{AuthProvider, TokenStore};
pub use backoff::Backoff;
pub use bus::{
    EventBus, HandlerError, HandlerId, HandlerResult, ListenerHandle, Listeners, Subscription,
};
pub use connection::{
    ConnectionConfig, ConnectionError, ConnectionManager, ConnectionResult, ConnectionState,
    Phase, UNAUTHORIZED_EVENT,
};
pub use groups::{GroupMembership, ReplayReport};
pub use transport::{
    Channel, OpenFuture, Transport, TransportError, TransportResult, WebSocketTransport,
};



#[cfg(test)]
mod groups_tests;
