//! Core business logic
//!
//! # Modules
//!
//! - [`dataset`] - gridded datasets and the NetCDF reader
//! - [`transform`] - flattening variables into gzip-compressed CSV
//! - [`registration`] - partition registration and status polling
//! - [`verification`] - payload checksums
//! - [`export`] - dispatch and per-variable export
//!
//! # Export Workflow
//!
//! 1. **Resolve**: parse the notification into bucket and key
//! 2. **Load**: download the object and read it as a dataset, once
//! 3. **Fan out**: one task per configured variable
//! 4. **Transform**: flatten and gzip the variable
//! 5. **Upload**: write it under its partition key
//! 6. **Register**: add the partition and poll until it settles
//! 7. **Report**: collect every outcome into a summary
//!
//! # Example
//!
//! ```rust,no_run
//! use gridload::config::load_config;
//! use gridload::core::export::Dispatcher;
//!
//! # async fn example(event: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("gridload.toml")?;
//! let dispatcher = Dispatcher::from_config(config).await;
//!
//! let summary = dispatcher.handle(event).await?;
//! println!("Succeeded: {}", summary.succeeded());
//! println!("Failed: {}", summary.failed());
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod export;
pub mod registration;
pub mod transform;
pub mod verification;
