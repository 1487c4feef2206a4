//! Domain error types
//!
//! This module defines the error hierarchy for gridload. All errors are
//! domain-specific and don't expose third-party SDK types.

use thiserror::Error;

/// Main gridload error type
///
/// This is the primary error type used throughout the application.
/// Fatal dispatch errors and per-variable export errors share it.
#[derive(Debug, Error)]
pub enum GridloadError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed triggering notification
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The source file could not be opened as a dataset
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// The requested variable is not present in the dataset
    #[error("Variable '{0}' not found in dataset")]
    MissingVariable(String),

    /// Tabular conversion or compression failed
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Partition registration errors
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An export task panicked or was aborted before reporting
    #[error("Export task failed: {0}")]
    TaskFailed(String),
}

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage client could not be built
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// Fetching the source object failed
    #[error("Failed to download s3://{bucket}/{key}: {message}")]
    DownloadFailed {
        bucket: String,
        key: String,
        message: String,
    },

    /// Writing the converted object failed
    #[error("Failed to upload s3://{bucket}/{key}: {message}")]
    UploadFailed {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Partition registration errors
///
/// A query that reached a terminal failure state is kept apart from one
/// that never left a pending state before the deadline.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The query could not be submitted
    #[error("Failed to submit query: {0}")]
    SubmitFailed(String),

    /// The service accepted the query but returned no execution id
    #[error("Query service returned no execution id")]
    MissingExecutionId,

    /// Reading the execution status failed
    #[error("Failed to read status of query {execution_id}: {message}")]
    StatusFailed {
        execution_id: String,
        message: String,
    },

    /// The query finished in the FAILED state
    #[error("Query {execution_id} failed: {reason}")]
    Failed {
        execution_id: String,
        reason: String,
    },

    /// The query finished in the CANCELLED state
    #[error("Query {execution_id} was cancelled: {reason}")]
    Cancelled {
        execution_id: String,
        reason: String,
    },

    /// The query was still pending when the poll deadline passed
    #[error("Query {execution_id} still {last_state} after {waited_secs}s")]
    Timeout {
        execution_id: String,
        waited_secs: u64,
        last_state: String,
    },
}

// Conversion from std::io::Error
impl From<std::io::Error> for GridloadError {
    fn from(err: std::io::Error) -> Self {
        GridloadError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for GridloadError {
    fn from(err: serde_json::Error) -> Self {
        GridloadError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for GridloadError {
    fn from(err: toml::de::Error) -> Self {
        GridloadError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer errors
impl From<csv::Error> for GridloadError {
    fn from(err: csv::Error) -> Self {
        GridloadError::Conversion(format!("CSV error: {err}"))
    }
}
