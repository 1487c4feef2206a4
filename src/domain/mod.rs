//! Domain models and types for gridload.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated identifiers** ([`VariableName`], [`QueryExecutionId`])
//! - **Trigger parsing** ([`SourceObject`])
//! - **Jobs and partition layout** ([`ExportJob`], [`LoadStamp`], [`PartitionKey`])
//! - **Error types** ([`GridloadError`], [`StorageError`], [`RegistrationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use gridload::domain::{ExportJob, LoadStamp, VariableName};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let job = ExportJob::new(
//!     "met-office-data",
//!     VariableName::new("air_temperature")?,
//!     LoadStamp::now(),
//!     "weather",
//! );
//! let key = job.partition_key();
//! assert!(key.as_str().starts_with("air_temperature/load_dt="));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod job;
pub mod notification;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{GridloadError, RegistrationError, StorageError};
pub use ids::{QueryExecutionId, VariableName};
pub use job::{ExportJob, LoadStamp, PartitionKey};
pub use notification::SourceObject;
pub use result::Result;
