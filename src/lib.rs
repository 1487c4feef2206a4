// Gridload - NetCDF forecast to Athena partition loader
// Copyright (c) 2025 Gridload Contributors
// Licensed under the MIT License

//! # Gridload - NetCDF forecast to Athena partitions
//!
//! Gridload reacts to "object created" notifications for gridded forecast
//! files. It opens the file once, and for each configured variable writes a
//! gzip-compressed CSV table into a partitioned S3 layout, then registers
//! the new partition with Amazon Athena.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Datasets, flattening, registration polling, dispatch
//! - [`adapters`] - S3 object storage and Athena
//! - [`domain`] - Notifications, jobs, partition keys and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridload::config::load_config_from_env;
//! use gridload::core::export::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_from_env()?;
//!     let dispatcher = Dispatcher::from_config(config).await;
//!
//!     let event = std::fs::read_to_string("event.json")?;
//!     let summary = dispatcher.handle(&event).await?;
//!
//!     for receipt in summary.receipts() {
//!         println!("{} -> {}", receipt.variable, receipt.key);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Partition layout
//!
//! Every variable of one notification shares a load date and timestamp:
//!
//! ```text
//! air_temperature/load_dt=2024-03-09/ts=20240309070501/<uuid>air_temperature.gz
//! ```
//!
//! and is registered with
//!
//! ```sql
//! ALTER TABLE <db>.air_temperature ADD IF NOT EXISTS
//!     PARTITION(load_dt='2024-03-09',ts='20240309070501');
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::GridloadError`]. Failures that prevent the
//! file from being read abort the dispatch; a failing variable is recorded
//! in the [`core::export::DispatchSummary`] while the others continue.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
