// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for invsync-core operations.

use thiserror::Error;

/// All possible errors that can occur in invsync-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown hub event: '{0}'")]
    UnknownEvent(String),

    #[error("hub event '{event}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        event: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument for hub event '{event}': {source}")]
    InvalidArgument {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid transaction type: '{0}'\n  hint: valid types are: in, out, adjust")]
    InvalidTransactionType(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for invsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
