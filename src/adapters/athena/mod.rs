//! Amazon Athena integration
//!
//! Partition registration statements are submitted through a
//! [`QueryService`]; [`AthenaClient`] is the production implementation.

pub mod client;
pub mod models;
pub mod traits;

pub use client::AthenaClient;
pub use models::{QueryRequest, QueryState, QueryStatus};
pub use traits::QueryService;
