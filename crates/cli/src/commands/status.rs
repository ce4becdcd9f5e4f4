// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync status`: connect once and report.

use serde::Serialize;

use super::{print_json, Context};
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::hub::ConnectionError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub hub_url: String,
    pub phase: &'static str,
    pub connection_id: Option<String>,
    /// Clients connected to the hub, when the hub answered.
    pub clients: Option<u64>,
    pub pending: usize,
}

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    ctx.require_auth()?;
    let hub = ctx.connection().await?;

    match hub.connect().await {
        Ok(()) => {}
        Err(ConnectionError::AuthenticationRequired) => {
            return Err(ConnectionError::AuthenticationRequired.into());
        }
        Err(e) => {
            hub.disconnect();
            return Err(Error::HubUnreachable {
                reason: e.to_string(),
            });
        }
    }

    let clients = match hub.get_connection_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "connection count unavailable");
            None
        }
    };
    let state = hub.state();
    hub.disconnect();

    let report = StatusReport {
        hub_url: ctx.config.hub_url.clone(),
        phase: state.phase.as_str(),
        connection_id: state.connection_id,
        clients,
        pending: ctx.open_queue()?.count()?,
    };
    match output {
        OutputFormat::Text => println!("{}", format_status(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

pub fn format_status(report: &StatusReport) -> String {
    let mut lines = vec![
        format!("Status: {}", report.phase),
        format!("Hub: {}", report.hub_url),
    ];
    if let Some(id) = &report.connection_id {
        lines.push(format!("Connection: {}", id));
    }
    lines.push(match report.clients {
        Some(count) => format!("Clients: {}", count),
        None => "Clients: unknown".to_string(),
    });
    lines.push(format!("Pending ops: {}", report.pending));
    lines.join("\n")
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
