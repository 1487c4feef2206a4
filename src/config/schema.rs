//! Configuration schema types
//!
//! This module defines the configuration structure for gridload. Every
//! section has defaults so a configuration can be assembled from the
//! environment alone.

use crate::config::SecretString;
use crate::domain::ids::{is_identifier, VariableName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Main gridload configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridloadConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source file handling
    #[serde(default)]
    pub source: SourceConfig,

    /// Variables to export
    #[serde(default)]
    pub export: ExportConfig,

    /// Partition registration target
    #[serde(default)]
    pub athena: AthenaConfig,

    /// Object storage client settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GridloadConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.export.validate()?;
        self.athena.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (convert only, no upload or registration)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Source file handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory the triggering object is downloaded into
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.scratch_dir.trim().is_empty() {
            return Err("source.scratch_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Dataset variables to export, one task and one table each
    #[serde(default = "default_variables")]
    pub variables: Vec<VariableName>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.variables.is_empty() {
            return Err("export.variables cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for variable in &self.variables {
            if !seen.insert(variable.as_str()) {
                return Err(format!(
                    "export.variables contains '{variable}' more than once"
                ));
            }
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            variables: default_variables(),
        }
    }
}

/// Athena partition registration configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// Target database (`DB_NAME`)
    #[serde(default)]
    pub database: String,

    /// S3 location for query result metadata (`ATHENA_OP_LOC`)
    #[serde(default)]
    pub output_location: String,

    /// Optional Athena workgroup
    #[serde(default)]
    pub workgroup: Option<String>,

    /// Status polling settings
    #[serde(default)]
    pub polling: PollingConfig,
}

impl AthenaConfig {
    fn validate(&self) -> Result<(), String> {
        if self.database.is_empty() {
            return Err(
                "athena.database cannot be empty (set it in the file or via DB_NAME)".to_string(),
            );
        }

        if !is_identifier(&self.database) {
            return Err(format!(
                "athena.database '{}' must contain only letters, digits and underscores",
                self.database
            ));
        }

        if self.output_location.is_empty() {
            return Err(
                "athena.output_location cannot be empty (set it in the file or via ATHENA_OP_LOC)"
                    .to_string(),
            );
        }

        let url = url::Url::parse(&self.output_location).map_err(|e| {
            format!(
                "athena.output_location '{}' is not a valid URL: {e}",
                self.output_location
            )
        })?;
        if url.scheme() != "s3" || url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(format!(
                "athena.output_location must be an s3://bucket/prefix URL, got '{}'",
                self.output_location
            ));
        }

        if let Some(workgroup) = &self.workgroup {
            if workgroup.trim().is_empty() {
                return Err("athena.workgroup cannot be blank when set".to_string());
            }
        }

        self.polling.validate()
    }
}

/// Registration status polling configuration
///
/// The wait between status checks starts at `initial_interval_secs`, grows by
/// `multiplier` after every check and is capped at `max_interval_secs`. The
/// total wait is bounded by `timeout_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// First wait before re-checking, in seconds
    #[serde(default = "default_initial_interval_secs")]
    pub initial_interval_secs: u64,

    /// Upper bound for a single wait, in seconds
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: f64,

    /// Total time allowed for the query to finish, in seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
}

/// Longest registration wait accepted, one day
pub const MAX_POLL_TIMEOUT_SECS: u64 = 86_400;

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.initial_interval_secs == 0 {
            return Err("athena.polling.initial_interval_secs must be > 0".to_string());
        }
        if self.max_interval_secs < self.initial_interval_secs {
            return Err(format!(
                "athena.polling.max_interval_secs ({}) must be >= initial_interval_secs ({})",
                self.max_interval_secs, self.initial_interval_secs
            ));
        }
        if self.timeout_secs < self.max_interval_secs {
            return Err(format!(
                "athena.polling.timeout_secs ({}) must be >= max_interval_secs ({})",
                self.timeout_secs, self.max_interval_secs
            ));
        }
        if self.timeout_secs > MAX_POLL_TIMEOUT_SECS {
            return Err(format!(
                "athena.polling.timeout_secs ({}) must be <= {MAX_POLL_TIMEOUT_SECS}",
                self.timeout_secs
            ));
        }
        if !(self.multiplier >= 1.0 && self.multiplier <= 10.0) {
            return Err(format!(
                "athena.polling.multiplier must be between 1.0 and 10.0, got {}",
                self.multiplier
            ));
        }
        Ok(())
    }

    /// First wait as a Duration
    pub fn initial_interval(&self) -> Duration {
        Duration::from_secs(self.initial_interval_secs)
    }

    /// Wait cap as a Duration
    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_secs)
    }

    /// Total deadline as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_secs: default_initial_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            multiplier: default_backoff_multiplier(),
            timeout_secs: default_poll_timeout_secs(),
        }
    }
}

/// Object storage client configuration
///
/// Credentials normally come from the AWS default chain; static keys are
/// only for local runs against S3-compatible endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// AWS region override
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Allow plain HTTP to the custom endpoint
    #[serde(default)]
    pub allow_http: bool,

    /// Static access key id
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("storage.endpoint must start with http:// or https://".to_string());
            }
            if endpoint.starts_with("http://") && !self.allow_http {
                return Err(
                    "storage.endpoint uses http:// but storage.allow_http is false".to_string(),
                );
            }
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "storage.access_key_id and storage.secret_access_key must be set together"
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_scratch_dir() -> String {
    std::env::temp_dir().to_string_lossy().to_string()
}

/// Variables exported when none are configured
pub const DEFAULT_VARIABLES: [&str; 4] = [
    "dew_point_temperature",
    "air_temperature",
    "wind_speed_of_gust",
    "visibility_in_air",
];

fn default_variables() -> Vec<VariableName> {
    DEFAULT_VARIABLES
        .iter()
        .filter_map(|name| VariableName::new(*name).ok())
        .collect()
}

fn default_initial_interval_secs() -> u64 {
    5
}

fn default_max_interval_secs() -> u64 {
    30
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_poll_timeout_secs() -> u64 {
    300
}

fn default_local_path() -> String {
    "/var/log/gridload".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
