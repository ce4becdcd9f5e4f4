// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `invsync scan`: submit a scan or queue it for later.

use invsync_core::{ScanSubmission, TransactionType};
use serde_json::json;

use super::{print_json, Context};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::SubmitOutcome;

/// Arguments of `invsync scan`.
#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub code: String,
    pub quantity: i64,
    pub transaction_type: TransactionType,
    pub by: Option<String>,
    pub note: Option<String>,
    pub offline: bool,
}

impl ScanArgs {
    pub fn submission(&self) -> Result<ScanSubmission> {
        let mut submission =
            ScanSubmission::new(self.code.trim(), self.quantity, self.transaction_type)?;
        if let Some(by) = &self.by {
            submission = submission.submitted_by(by.as_str());
        }
        if let Some(note) = self.note.as_deref().filter(|n| !n.trim().is_empty()) {
            submission = submission.note(note);
        }
        Ok(submission)
    }
}

pub async fn run(ctx: &Context, args: ScanArgs, output: OutputFormat) -> Result<()> {
    let submission = args.submission()?;
    let sync = ctx.coordinator(!args.offline)?;

    let outcome = sync.submit(submission.to_payload()?).await?;
    let pending = sync.pending_count()?;

    match (output, outcome) {
        (OutputFormat::Text, SubmitOutcome::Sent(_)) => {
            println!("Submitted {}", describe(&submission));
        }
        (OutputFormat::Text, SubmitOutcome::Queued(id)) => {
            let reason = if args.offline {
                "offline"
            } else {
                "server unreachable"
            };
            println!("Queued {} as {} ({})", describe(&submission), id, reason);
            println!("Pending ops: {}", pending);
        }
        (OutputFormat::Json, SubmitOutcome::Sent(reply)) => print_json(&json!({
            "status": "sent",
            "reply": reply,
            "pending": pending,
        }))?,
        (OutputFormat::Json, SubmitOutcome::Queued(id)) => print_json(&json!({
            "status": "queued",
            "id": id,
            "pending": pending,
        }))?,
    }
    Ok(())
}

pub fn describe(submission: &ScanSubmission) -> String {
    format!(
        "{} {} {}",
        submission.transaction_type, submission.quantity, submission.product_code
    )
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
