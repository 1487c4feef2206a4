//! Init command implementation
//!
//! Writes a starter configuration file.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "gridload.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing gridload configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export DB_NAME and ATHENA_OP_LOC (or set them in the file)");
                println!(
                    "  3. Validate configuration: gridload --config {} validate-config",
                    self.output
                );
                println!(
                    "  4. Try a notification: gridload --config {} run --event event.json --dry-run",
                    self.output
                );
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# gridload configuration
# DB_NAME and ATHENA_OP_LOC in the environment override the [athena] values.

[application]
log_level = "info"

[export]
variables = [
    "dew_point_temperature",
    "air_temperature",
    "wind_speed_of_gust",
    "visibility_in_air",
]

[athena]
database = "${DB_NAME}"
output_location = "${ATHENA_OP_LOC}"
"#
        .to_string()
    }

    /// Generate configuration with every option documented
    fn generate_config_with_examples() -> String {
        r#"# gridload configuration
#
# Loads gridded forecast files named in S3 notifications into per-variable
# Athena tables. Values may reference environment variables as ${VAR}.
#
# Overrides, applied in order after this file:
#   GRIDLOAD_<SECTION>_<KEY>   e.g. GRIDLOAD_APPLICATION_DRY_RUN=true
#   DB_NAME                    athena.database
#   ATHENA_OP_LOC              athena.output_location

[application]
# trace | debug | info | warn | error
log_level = "info"
# Convert and hash only; skip uploads and partition registration
dry_run = false

[source]
# Where the triggering object is downloaded before it is opened
scratch_dir = "/tmp"

[export]
# One table per variable; each must exist in the source file
variables = [
    "dew_point_temperature",
    "air_temperature",
    "wind_speed_of_gust",
    "visibility_in_air",
]

[athena]
database = "weather"
output_location = "s3://athena-query-results/gridload/"
# workgroup = "primary"

[athena.polling]
# Wait before the second status check, in seconds
initial_interval_secs = 5
# Upper bound for one wait
max_interval_secs = 30
# Growth factor between waits
multiplier = 2.0
# Give up on a registration query after this long
timeout_secs = 300

[storage]
# Credentials and region come from the AWS default chain unless set here
# region = "eu-west-2"
# endpoint = "http://localhost:9000"
# allow_http = true
# access_key_id = "${GRIDLOAD_STORAGE_ACCESS_KEY_ID}"
# secret_access_key = "${GRIDLOAD_STORAGE_SECRET_ACCESS_KEY}"

[logging]
local_enabled = false
local_path = "/var/log/gridload"
# daily | hourly
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridloadConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "gridload.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "gridload.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config_parses() {
        let content = InitArgs::generate_minimal_config();
        let config: GridloadConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.export.variables.len(), 4);
        assert_eq!(config.athena.database, "${DB_NAME}");
    }

    #[test]
    fn test_generate_config_with_examples_is_valid() {
        let content = InitArgs::generate_config_with_examples();
        let config: GridloadConfig = toml::from_str(&content).unwrap();
        config.validate().unwrap();
        assert_eq!(config.athena.polling.timeout_secs, 300);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gridload.toml");
        fs::write(&path, "# existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# existing");
    }

    #[tokio::test]
    async fn test_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gridload.toml");

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&path).unwrap().contains("[athena.polling]"));
    }
}
