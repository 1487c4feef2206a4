//! Configuration management for gridload.
//!
//! Configuration is an explicit struct built once at entry and passed down to
//! the dispatcher and exporters. It can come from a TOML file or from the
//! environment alone.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gridload::config::{load_config, load_config_from_env};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // From a file
//! let config = load_config("gridload.toml")?;
//!
//! // Or from DB_NAME / ATHENA_OP_LOC and GRIDLOAD_* variables
//! let config = load_config_from_env()?;
//! println!("Athena database: {}", config.athena.database);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! variables = ["air_temperature", "visibility_in_air"]
//!
//! [athena]
//! database = "${DB_NAME}"
//! output_location = "s3://athena-results/gridload/"
//!
//! [athena.polling]
//! initial_interval_secs = 5
//! timeout_secs = 300
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_env};
pub use schema::{
    ApplicationConfig, AthenaConfig, ExportConfig, GridloadConfig, LoggingConfig, PollingConfig,
    SourceConfig, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
