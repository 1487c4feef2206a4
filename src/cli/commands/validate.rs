//! Validate config command implementation

use crate::cli::{Cli, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let source = cli.config.as_deref().unwrap_or("environment");
        tracing::info!(source = %source, "Validating configuration");

        println!("🔍 Validating configuration from: {source}");
        println!();

        // Loading validates as well
        let config = match cli.load_config() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Scratch Dir: {}", config.source.scratch_dir);
        println!(
            "  Variables: {}",
            config
                .export
                .variables
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Athena Database: {}", config.athena.database);
        println!("  Athena Output: {}", config.athena.output_location);
        if let Some(workgroup) = &config.athena.workgroup {
            println!("  Athena Workgroup: {workgroup}");
        }
        println!(
            "  Polling: {}s initial, {}s max, x{}, {}s timeout",
            config.athena.polling.initial_interval_secs,
            config.athena.polling.max_interval_secs,
            config.athena.polling.multiplier,
            config.athena.polling.timeout_secs
        );
        if let Some(endpoint) = &config.storage.endpoint {
            println!("  Storage Endpoint: {endpoint}");
        }
        println!(
            "  Static Credentials: {}",
            if config.storage.access_key_id.is_some() {
                "configured"
            } else {
                "none (AWS default chain)"
            }
        );
        println!();
        Ok(EXIT_SUCCESS)
    }
}
