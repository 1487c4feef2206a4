//! Export orchestration
//!
//! - [`dispatcher`] - turns one notification into concurrent variable exports
//! - [`exporter`] - exports one variable: flatten, upload, register
//! - [`summary`] - per-variable outcomes of a dispatch

pub mod dispatcher;
pub mod exporter;
pub mod summary;

pub use dispatcher::Dispatcher;
pub use exporter::{ExportReceipt, Exporter};
pub use summary::{DispatchStatus, DispatchSummary, VariableOutcome};
