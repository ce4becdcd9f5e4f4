// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hub protocol messages for client-server communication.
//!
//! The protocol is simple:
//! - Client invokes named hub methods and waits for a matching completion
//! - Server opens every session with a handshake carrying the connection ID
//! - Server pushes named events to every interested client

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hub methods the client may invoke.
pub mod methods {
    pub const JOIN_GROUP: &str = "JoinGroup";
    pub const LEAVE_GROUP: &str = "LeaveGroup";
    pub const GET_CONNECTION_COUNT: &str = "GetConnectionCount";
}

/// Events the server pushes to clients.
pub mod events {
    pub const PRODUCT_UPDATED: &str = "ProductUpdated";
    pub const SCAN_PROCESSED: &str = "ScanProcessed";
    pub const LIVE_METRICS_UPDATE: &str = "LiveMetricsUpdate";
    pub const LOW_STOCK_ALERT: &str = "LowStockAlert";
    pub const USER_CONNECTED: &str = "UserConnected";
    pub const USER_DISCONNECTED: &str = "UserDisconnected";
    pub const CONNECTION_COUNT_UPDATED: &str = "ConnectionCountUpdated";

    /// Every event the hub is known to push, in declaration order.
    pub const ALL: [&str; 7] = [
        PRODUCT_UPDATED,
        SCAN_PROCESSED,
        LIVE_METRICS_UPDATE,
        LOW_STOCK_ALERT,
        USER_CONNECTED,
        USER_DISCONNECTED,
        CONNECTION_COUNT_UPDATED,
    ];
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Invoke a hub method.
    ///
    /// The server answers with a `Completion` carrying the same ID.
    Invocation {
        /// Client-chosen ID echoed in the completion.
        invocation_id: u64,
        /// Hub method name.
        target: String,
        /// Positional arguments.
        #[serde(default)]
        arguments: Vec<Value>,
    },

    /// Keepalive.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame of every session.
    Handshake {
        /// Server-assigned identifier for this connection.
        connection_id: String,
    },

    /// Result of an invocation.
    Completion {
        /// Echoed from the invocation.
        invocation_id: u64,
        /// Return value of the hub method, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        /// Error description when the method failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// A server-pushed event.
    Event {
        /// Event name.
        target: String,
        /// Positional event arguments.
        #[serde(default)]
        arguments: Vec<Value>,
    },

    /// Keepalive.
    Ping,

    /// Server is closing the session.
    Close {
        /// Human-readable reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        /// Set when the session was closed because the credential was rejected.
        #[serde(default)]
        unauthorized: bool,
    },
}

impl ClientMessage {
    /// Creates an Invocation message.
    pub fn invocation(invocation_id: u64, target: impl Into<String>, arguments: Vec<Value>) -> Self {
        ClientMessage::Invocation {
            invocation_id,
            target: target.into(),
            arguments,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a Handshake message.
    pub fn handshake(connection_id: impl Into<String>) -> Self {
        ServerMessage::Handshake {
            connection_id: connection_id.into(),
        }
    }

    /// Creates a successful Completion message.
    pub fn completion(invocation_id: u64, result: Option<Value>) -> Self {
        ServerMessage::Completion {
            invocation_id,
            result,
            error: None,
        }
    }

    /// Creates a failed Completion message.
    pub fn completion_error(invocation_id: u64, error: impl Into<String>) -> Self {
        ServerMessage::Completion {
            invocation_id,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Creates an Event message.
    pub fn event(target: impl Into<String>, arguments: Vec<Value>) -> Self {
        ServerMessage::Event {
            target: target.into(),
            arguments,
        }
    }

    /// Creates a Close message.
    pub fn close(error: Option<String>, unauthorized: bool) -> Self {
        ServerMessage::Close {
            error,
            unauthorized,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
