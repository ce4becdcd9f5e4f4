// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed payloads for server-pushed hub events.
//!
//! Events travel as a name plus a positional argument array. [`HubEvent::decode`]
//! turns that pair into a typed value for consumers that don't want to work
//! with raw JSON. Unknown fields are preserved in `extra` maps so newer servers
//! don't break older clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::protocol::events;

/// A product as broadcast by the hub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A processed scan transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanTransaction {
    #[serde(default)]
    pub id: Option<Value>,
    pub product_code: String,
    pub quantity: i64,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Live dashboard metrics. The hub decides which keys are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LiveMetrics {
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

/// A decoded server-pushed event.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    ProductUpdated { code: String, product: Product },
    ScanProcessed(ScanTransaction),
    LiveMetricsUpdate(LiveMetrics),
    LowStockAlert { code: String, days_remaining: f64 },
    UserConnected { user_id: String },
    UserDisconnected { user_id: String },
    ConnectionCountUpdated { count: u64 },
}

impl HubEvent {
    /// Decodes an event from its wire name and argument array.
    pub fn decode(target: &str, arguments: &[Value]) -> Result<Self> {
        match target {
            events::PRODUCT_UPDATED => {
                let name = events::PRODUCT_UPDATED;
                expect_args(name, arguments, 2)?;
                Ok(HubEvent::ProductUpdated {
                    code: arg(name, &arguments[0])?,
                    product: arg(name, &arguments[1])?,
                })
            }
            events::SCAN_PROCESSED => {
                let name = events::SCAN_PROCESSED;
                expect_args(name, arguments, 1)?;
                Ok(HubEvent::ScanProcessed(arg(name, &arguments[0])?))
            }
            events::LIVE_METRICS_UPDATE => {
                let name = events::LIVE_METRICS_UPDATE;
                expect_args(name, arguments, 1)?;
                Ok(HubEvent::LiveMetricsUpdate(arg(name, &arguments[0])?))
            }
            events::LOW_STOCK_ALERT => {
                let name = events::LOW_STOCK_ALERT;
                expect_args(name, arguments, 2)?;
                Ok(HubEvent::LowStockAlert {
                    code: arg(name, &arguments[0])?,
                    days_remaining: arg(name, &arguments[1])?,
                })
            }
            events::USER_CONNECTED => {
                let name = events::USER_CONNECTED;
                expect_args(name, arguments, 1)?;
                Ok(HubEvent::UserConnected {
                    user_id: user_id(name, &arguments[0])?,
                })
            }
            events::USER_DISCONNECTED => {
                let name = events::USER_DISCONNECTED;
                expect_args(name, arguments, 1)?;
                Ok(HubEvent::UserDisconnected {
                    user_id: user_id(name, &arguments[0])?,
                })
            }
            events::CONNECTION_COUNT_UPDATED => {
                let name = events::CONNECTION_COUNT_UPDATED;
                expect_args(name, arguments, 1)?;
                Ok(HubEvent::ConnectionCountUpdated {
                    count: arg(name, &arguments[0])?,
                })
            }
            other => Err(Error::UnknownEvent(other.to_string())),
        }
    }

    /// Returns the wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            HubEvent::ProductUpdated { .. } => events::PRODUCT_UPDATED,
            HubEvent::ScanProcessed(_) => events::SCAN_PROCESSED,
            HubEvent::LiveMetricsUpdate(_) => events::LIVE_METRICS_UPDATE,
            HubEvent::LowStockAlert { .. } => events::LOW_STOCK_ALERT,
            HubEvent::UserConnected { .. } => events::USER_CONNECTED,
            HubEvent::UserDisconnected { .. } => events::USER_DISCONNECTED,
            HubEvent::ConnectionCountUpdated { .. } => events::CONNECTION_COUNT_UPDATED,
        }
    }
}

fn expect_args(event: &'static str, arguments: &[Value], expected: usize) -> Result<()> {
    // Extra trailing arguments are tolerated; servers may append fields.
    if arguments.len() < expected {
        return Err(Error::ArgumentCount {
            event,
            expected,
            actual: arguments.len(),
        });
    }
    Ok(())
}

fn arg<T: DeserializeOwned>(event: &'static str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|source| Error::InvalidArgument { event, source })
}

/// User IDs arrive as strings or numbers depending on the server's key type.
fn user_id(event: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => arg::<String>(event, other),
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
