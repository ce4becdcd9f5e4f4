// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync queue`: inspect the offline queue.

use invsync_core::QueuedOperation;
use serde_json::Value;

use super::{print_json, Context};
use crate::cli::{OutputFormat, QueueCommand};
use crate::error::Result;

pub fn run(ctx: &Context, cmd: QueueCommand) -> Result<()> {
    let queue = ctx.open_queue()?;
    match cmd {
        QueueCommand::Count => println!("{}", queue.count()?),
        QueueCommand::List { output } => {
            let ops = queue.list()?;
            match output.output {
                OutputFormat::Json => print_json(&ops)?,
                OutputFormat::Text if ops.is_empty() => println!("No queued operations"),
                OutputFormat::Text => {
                    for op in &ops {
                        println!("{}", format_line(op));
                    }
                }
            }
        }
    }
    Ok(())
}

/// `<id>  <created>  <summary>`
pub fn format_line(op: &QueuedOperation) -> String {
    format!(
        "{}  {}  {}",
        op.id,
        op.created_at.format("%Y-%m-%d %H:%M:%S"),
        summarize(&op.payload)
    )
}

fn summarize(payload: &Value) -> String {
    let code = payload.get("productCode").and_then(Value::as_str);
    let quantity = payload.get("quantity").and_then(Value::as_i64);
    match (code, quantity) {
        (Some(code), Some(quantity)) => {
            let kind = payload
                .get("transactionType")
                .and_then(Value::as_str)
                .unwrap_or("scan");
            format!("{} {} {}", kind, quantity, code)
        }
        _ => payload.to_string(),
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
