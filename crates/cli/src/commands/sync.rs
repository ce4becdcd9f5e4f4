// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync sync`: drain the offline queue now.

use serde_json::json;

use super::{print_json, Context};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::DrainOutcome;

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let sync = ctx.coordinator(true)?;
    let outcome = sync.drain().await?;
    let pending = sync.pending_count()?;
    let report = outcome.report();

    match output {
        OutputFormat::Text => println!("{}", format_outcome(&outcome, pending)),
        OutputFormat::Json => print_json(&json!({
            "succeeded": report.succeeded,
            "failed": report.failed,
            "pending": pending,
        }))?,
    }
    Ok(())
}

pub fn format_outcome(outcome: &DrainOutcome, pending: usize) -> String {
    match outcome {
        DrainOutcome::Empty => "Nothing to sync".to_string(),
        DrainOutcome::Offline => "Sync skipped: offline".to_string(),
        DrainOutcome::AlreadyDraining => "Sync skipped: already in progress".to_string(),
        DrainOutcome::Completed(report) => format!(
            "Synced: {} succeeded, {} failed\nPending ops: {}",
            report.succeeded, report.failed, pending
        ),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
