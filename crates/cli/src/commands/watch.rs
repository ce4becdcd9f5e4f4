// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync watch`: stream hub events until interrupted.
//!
//! Hub connectivity doubles as the network signal, so queued scans are
//! drained every time the connection comes back.

use chrono::Utc;
use invsync_core::protocol::events;
use invsync_core::HubEvent;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::hub::{ConnectionError, ConnectionState, Phase, UNAUTHORIZED_EVENT};
use crate::sync::QUEUE_CHANGED_EVENT;

pub async fn run(ctx: &Context, extra_groups: Vec<String>, output: OutputFormat) -> Result<()> {
    ctx.require_auth()?;
    let hub = ctx.connection().await?;
    for group in &extra_groups {
        hub.join_group(group).await?;
    }

    let sync = ctx.coordinator(false)?;
    sync.publish_queue_changes(hub.bus());
    let auto_sync = sync.spawn_auto_sync();

    let (state_tx, mut state_rx) = mpsc::unbounded_channel::<ConnectionState>();
    let network = sync.network().clone();
    hub.on_state_change(move |state| {
        network.set_online(state.is_connected());
        let _ = state_tx.send(state.clone());
    });

    for name in events::ALL {
        hub.bus().on(name, move |args| {
            println!("{}", render(name, args, output));
            Ok(())
        });
    }
    hub.bus().on(QUEUE_CHANGED_EVENT, move |args| {
        println!("{}", render(QUEUE_CHANGED_EVENT, args, output));
        Ok(())
    });
    hub.bus().on(UNAUTHORIZED_EVENT, |args| {
        let reason = args.first().and_then(Value::as_str).unwrap_or("unknown");
        eprintln!("warning: hub rejected credential: {}", reason);
        Ok(())
    });

    if let Err(e) = hub.connect().await {
        if matches!(e, ConnectionError::AuthenticationRequired) {
            auto_sync.abort();
            return Err(e.into());
        }
        eprintln!("warning: {}; retrying in the background", e);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let result = loop {
        tokio::select! {
            signal = &mut ctrl_c => break signal.map_err(Error::from),
            Some(state) = state_rx.recv() => {
                if output == OutputFormat::Text {
                    eprintln!("connection: {}", state.phase.as_str());
                }
                if state.phase == Phase::Disconnected && !hub.has_pending_reconnect() {
                    break Err(ended(&state));
                }
            }
        }
    };

    hub.disconnect();
    auto_sync.abort();
    result
}

/// Why the connection stopped for good.
fn ended(state: &ConnectionState) -> Error {
    let reason = state
        .last_error
        .clone()
        .unwrap_or_else(|| "connection closed".to_string());
    if reason == ConnectionError::AuthenticationRequired.to_string() {
        ConnectionError::AuthenticationRequired.into()
    } else {
        Error::HubUnreachable { reason }
    }
}

fn render(name: &str, args: &[Value], output: OutputFormat) -> String {
    match output {
        OutputFormat::Json => json!({
            "at": Utc::now().to_rfc3339(),
            "event": name,
            "arguments": args,
        })
        .to_string(),
        OutputFormat::Text => format!("{}  {}", Utc::now().format("%H:%M:%S"), describe(name, args)),
    }
}

/// One-line human description of an event.
pub fn describe(name: &str, args: &[Value]) -> String {
    if name == QUEUE_CHANGED_EVENT {
        let count = args.first().and_then(Value::as_u64).unwrap_or(0);
        return format!("queue: {} pending", count);
    }
    let event = match HubEvent::decode(name, args) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(event = name, error = %e, "undecodable event");
            return format!("{} {}", name, Value::from(args.to_vec()));
        }
    };
    match event {
        HubEvent::ProductUpdated { code, product } => format!(
            "product {} updated: {} (qty {})",
            code, product.name, product.quantity
        ),
        HubEvent::ScanProcessed(tx) => format!(
            "scan processed: {} {} {} by {}",
            tx.product_code,
            tx.transaction_type.as_deref().unwrap_or("?"),
            tx.quantity,
            tx.submitted_by.as_deref().unwrap_or("unknown"),
        ),
        HubEvent::LiveMetricsUpdate(metrics) => {
            let mut fields: Vec<String> = metrics
                .values
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            format!("live metrics: {}", fields.join(", "))
        }
        HubEvent::LowStockAlert {
            code,
            days_remaining,
        } => format!(
            "low stock: {} ({:.1} days remaining)",
            code, days_remaining
        ),
        HubEvent::UserConnected { user_id } => format!("user connected: {}", user_id),
        HubEvent::UserDisconnected { user_id } => format!("user disconnected: {}", user_id),
        HubEvent::ConnectionCountUpdated { count } => format!("connections: {}", count),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
