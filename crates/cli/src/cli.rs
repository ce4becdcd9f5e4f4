// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use invsync_core::TransactionType;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

const QUICKSTART_HELP: &str = "\
Get started:
  export INVSYNC_TOKEN=...       Provide the bearer token
  invsync status                 Check the hub connection
  invsync scan SKU-1042 -q 3     Record a scan (queued if offline)
  invsync sync                   Submit queued scans";

#[derive(Parser)]
#[command(name = "invsync", version)]
#[command(about = "Offline-first inventory client with real-time hub updates")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: ./invsync.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output selection shared by commands.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to the hub and report the connection
    Status {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Stream hub events until interrupted
    Watch {
        /// Extra group to join (repeatable)
        #[arg(long, short = 'g', value_parser = non_empty_string)]
        group: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Submit a scan, queueing it if the server is unreachable
    Scan {
        /// Product code
        #[arg(value_parser = non_empty_string)]
        code: String,

        /// Quantity scanned
        #[arg(long, short = 'q', default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Transaction type (in, out, adjust)
        #[arg(long = "type", short = 't', default_value = "in")]
        transaction_type: TransactionType,

        /// Who performed the scan
        #[arg(long, value_parser = non_empty_string)]
        by: Option<String>,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,

        /// Queue without trying the server
        #[arg(long)]
        offline: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inspect the offline queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Submit every queued operation now
    Sync {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queued operations, oldest first
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the number of queued operations
    Count,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
