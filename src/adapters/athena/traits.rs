//! Query service abstraction
//!
//! The registration poller only needs to submit a statement and read its
//! state back, so tests can script state sequences without AWS.

use super::models::{QueryRequest, QueryStatus};
use crate::domain::ids::QueryExecutionId;
use crate::domain::Result;
use async_trait::async_trait;

/// Asynchronous SQL query service
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submit a query, returning its execution id without waiting for it
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::SubmitFailed` if the service rejects the
    /// request, or `MissingExecutionId` if it returns no id.
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryExecutionId>;

    /// Read the current state of an execution
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::StatusFailed` if the state cannot be read.
    async fn query_status(&self, execution_id: &QueryExecutionId) -> Result<QueryStatus>;
}
