//! Run command implementation
//!
//! Reads one storage notification and exports the configured variables of
//! the object it names.

use crate::cli::{Cli, EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::config::loader::parse_variable_list;
use crate::core::export::{DispatchStatus, DispatchSummary, Dispatcher};
use clap::Args;
use serde_json::json;
use tokio::io::AsyncReadExt;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Notification payload file, or `-` to read it from stdin
    #[arg(short, long, default_value = "-")]
    pub event: String,

    /// Convert and hash without uploading or registering partitions
    #[arg(long)]
    pub dry_run: bool,

    /// Override the variables to export (comma-separated)
    #[arg(long)]
    pub variables: Option<String>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        tracing::info!(event = %self.event, "Starting run command");

        let mut config = match cli.load_config() {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if let Some(variables) = &self.variables {
            match parse_variable_list(variables) {
                Ok(list) => {
                    tracing::info!(variables = ?list, "Overriding variables from CLI");
                    config.export.variables = list;
                }
                Err(e) => {
                    eprintln!("Invalid --variables: {e}");
                    return Ok(EXIT_CONFIG_ERROR);
                }
            }
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let event = match self.read_event().await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, source = %self.event, "Failed to read notification");
                eprintln!("Failed to read notification from {}: {e}", self.event);
                return Ok(EXIT_FATAL);
            }
        };

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - nothing will be uploaded or registered");
            println!();
        }

        let dispatcher = Dispatcher::from_config(config).await;
        let summary = match dispatcher.handle(&event).await {
            Ok(s) => s,
            Err(e) => {
                crate::log_error_with_context!(&e, "Dispatch failed");
                eprintln!("Dispatch failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
        } else {
            print_summary(&summary);
        }

        Ok(exit_code(&summary))
    }

    async fn read_event(&self) -> std::io::Result<String> {
        if self.event == "-" {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            Ok(buf)
        } else {
            tokio::fs::read_to_string(&self.event).await
        }
    }
}

/// Process exit code for a completed dispatch
pub fn exit_code(summary: &DispatchSummary) -> i32 {
    match summary.status() {
        DispatchStatus::Success => EXIT_SUCCESS,
        DispatchStatus::Partial | DispatchStatus::Failed => EXIT_PARTIAL,
    }
}

fn summary_json(summary: &DispatchSummary) -> serde_json::Value {
    let failures: Vec<_> = summary
        .failures()
        .map(|(variable, error)| json!({ "variable": variable, "error": error.to_string() }))
        .collect();

    json!({
        "source": { "bucket": summary.source_bucket, "key": summary.source_key },
        "load_dt": summary.stamp.load_dt(),
        "ts": summary.stamp.ts(),
        "dry_run": summary.dry_run,
        "duration_ms": summary.duration.as_millis() as u64,
        "exported": summary.receipts().collect::<Vec<_>>(),
        "failed": failures,
    })
}

fn print_summary(summary: &DispatchSummary) {
    println!("📊 Dispatch Summary:");
    println!("  Source: s3://{}/{}", summary.source_bucket, summary.source_key);
    println!(
        "  Partition: load_dt={} ts={}",
        summary.stamp.load_dt(),
        summary.stamp.ts()
    );
    println!("  Succeeded: {}", summary.succeeded());
    println!("  Failed: {}", summary.failed());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for receipt in summary.receipts() {
        println!(
            "  ✅ {} -> {} ({} rows, {} bytes)",
            receipt.variable, receipt.key, receipt.rows, receipt.compressed_bytes
        );
    }
    for (variable, error) in summary.failures() {
        println!("  ❌ {variable}: {error}");
    }
    println!();

    match summary.status() {
        DispatchStatus::Success => println!("✅ All variables exported"),
        DispatchStatus::Partial => println!("⚠️  Dispatch completed with failures"),
        DispatchStatus::Failed => println!("❌ No variable was exported"),
    }
}
