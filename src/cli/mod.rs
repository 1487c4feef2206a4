//! CLI interface and argument parsing

pub mod commands;

use crate::config::{load_config, load_config_from_env, GridloadConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};

/// Exit code: every variable exported
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: at least one variable failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration could not be loaded or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code: the dispatch itself failed
pub const EXIT_FATAL: i32 = 5;

/// Gridload - NetCDF forecast to Athena partition loader
#[derive(Parser, Debug)]
#[command(name = "gridload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file; without one, configuration is read
    /// from the environment (DB_NAME, ATHENA_OP_LOC, GRIDLOAD_*)
    #[arg(short, long, env = "GRIDLOAD_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GRIDLOAD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load configuration from `--config` or, failing that, the environment
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if loading or validation fails.
    pub fn load_config(&self) -> Result<GridloadConfig> {
        match &self.config {
            Some(path) => load_config(path),
            None => load_config_from_env(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the variables of the object named in a storage notification
    Run(commands::run::RunArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
