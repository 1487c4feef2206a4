//! Logging and observability
//!
//! Structured `tracing` logs with a console layer and optional JSON files
//! rotated by `tracing-appender`.
//!
//! # Example
//!
//! ```no_run
//! use gridload::logging::init_logging;
//! use gridload::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(bucket = "met-office-data", "Handling notification");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a finished variable export
///
/// # Example
///
/// ```no_run
/// use gridload::log_variable_export;
///
/// log_variable_export!("air_temperature", "air_temperature/load_dt=2024-01-01/ts=20240101000000/x.gz", 1200, 85);
/// ```
#[macro_export]
macro_rules! log_variable_export {
    ($variable:expr, $key:expr, $rows:expr, $duration_ms:expr) => {
        tracing::info!(
            variable = %$variable,
            key = %$key,
            rows = $rows,
            duration_ms = $duration_ms,
            "Variable exported"
        );
    };
}

/// Log a variable whose export failed
///
/// # Example
///
/// ```no_run
/// use gridload::log_variable_failure;
/// use gridload::domain::GridloadError;
///
/// let error = GridloadError::MissingVariable("wind_speed_of_gust".to_string());
/// log_variable_failure!("wind_speed_of_gust", &error);
/// ```
#[macro_export]
macro_rules! log_variable_failure {
    ($variable:expr, $error:expr) => {
        tracing::error!(
            variable = %$variable,
            error = %$error,
            "Variable export failed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use gridload::log_error_with_context;
/// use gridload::domain::GridloadError;
///
/// let error = GridloadError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
