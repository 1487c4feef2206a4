//! Amazon Athena client
//!
//! Wraps `aws-sdk-athena`; SDK error types never leave this module.

use super::models::{QueryRequest, QueryState, QueryStatus};
use super::traits::QueryService;
use crate::domain::errors::RegistrationError;
use crate::domain::ids::QueryExecutionId;
use crate::domain::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};

/// [`QueryService`] backed by Amazon Athena
#[derive(Debug, Clone)]
pub struct AthenaClient {
    client: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Create a client from the standard AWS environment
    /// (region, credentials chain, profile)
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: aws_sdk_athena::Client::new(&sdk_config),
        }
    }

    /// Wrap an already-configured SDK client
    pub fn new(client: aws_sdk_athena::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryService for AthenaClient {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryExecutionId> {
        let output = self
            .client
            .start_query_execution()
            .query_string(&request.query)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(&request.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .set_work_group(request.workgroup.clone())
            .send()
            .await
            .map_err(|e| RegistrationError::SubmitFailed(DisplayErrorContext(&e).to_string()))?;

        let id = output
            .query_execution_id()
            .ok_or(RegistrationError::MissingExecutionId)?;
        Ok(QueryExecutionId::new(id).map_err(|_| RegistrationError::MissingExecutionId)?)
    }

    async fn query_status(&self, execution_id: &QueryExecutionId) -> Result<QueryStatus> {
        let status_err = |message: String| RegistrationError::StatusFailed {
            execution_id: execution_id.to_string(),
            message,
        };

        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id.as_str())
            .send()
            .await
            .map_err(|e| status_err(DisplayErrorContext(&e).to_string()))?;

        let status = output
            .query_execution()
            .and_then(|q| q.status())
            .ok_or_else(|| status_err("response carried no status".to_string()))?;

        let state = match status.state() {
            Some(QueryExecutionState::Queued) => QueryState::Queued,
            Some(QueryExecutionState::Running) => QueryState::Running,
            Some(QueryExecutionState::Succeeded) => QueryState::Succeeded,
            Some(QueryExecutionState::Failed) => QueryState::Failed,
            Some(QueryExecutionState::Cancelled) => QueryState::Cancelled,
            Some(other) => {
                return Err(status_err(format!("unknown state {}", other.as_str())).into());
            }
            None => return Err(status_err("response carried no state".to_string()).into()),
        };

        Ok(QueryStatus {
            state,
            reason: status.state_change_reason().map(str::to_string),
        })
    }
}
