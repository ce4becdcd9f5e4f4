// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operations held in the offline queue.
//!
//! A [`QueuedOperation`] wraps an opaque payload with a client-generated ID
//! and a creation timestamp. The payload is passed through to the server
//! untouched; [`ScanSubmission`] is the typed shape the CLI produces.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Client-generated identifier for a queued operation.
///
/// Stable across reloads and sent to the server as the idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(String);

impl OpId {
    /// Generates a new random ID.
    pub fn generate() -> Self {
        OpId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OpId {
    fn from(s: &str) -> Self {
        OpId(s.to_string())
    }
}

impl From<String> for OpId {
    fn from(s: String) -> Self {
        OpId(s)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An operation waiting to be delivered to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedOperation {
    pub id: OpId,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl QueuedOperation {
    /// Creates a new operation with a fresh ID, stamped now.
    pub fn new(payload: Value) -> Self {
        QueuedOperation {
            id: OpId::generate(),
            payload,
            created_at: Utc::now(),
        }
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
    Adjust,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
            TransactionType::Adjust => "adjust",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "in" => Ok(TransactionType::In),
            "out" => Ok(TransactionType::Out),
            "adjust" => Ok(TransactionType::Adjust),
            _ => Err(Error::InvalidTransactionType(s.to_string())),
        }
    }
}

/// A barcode scan as submitted by a handheld or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSubmission {
    pub product_code: String,
    pub quantity: i64,
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ScanSubmission {
    /// Creates a submission, rejecting a blank product code.
    pub fn new(
        product_code: impl Into<String>,
        quantity: i64,
        transaction_type: TransactionType,
    ) -> Result<Self> {
        let product_code = product_code.into();
        if product_code.trim().is_empty() {
            return Err(Error::FieldEmpty {
                field: "product code",
            });
        }
        Ok(ScanSubmission {
            product_code,
            quantity,
            transaction_type,
            submitted_by: None,
            note: None,
        })
    }

    pub fn submitted_by(mut self, user: impl Into<String>) -> Self {
        self.submitted_by = Some(user.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Converts to the opaque payload stored in the queue.
    pub fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
