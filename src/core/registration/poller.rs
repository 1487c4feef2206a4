//! Bounded exponential-backoff polling of query executions

use crate::adapters::athena::{QueryService, QueryState, QueryStatus};
use crate::config::PollingConfig;
use crate::domain::errors::{GridloadError, RegistrationError};
use crate::domain::ids::QueryExecutionId;
use crate::domain::Result;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a single status check
enum Poll {
    /// QUEUED or RUNNING, worth checking again
    Pending(QueryState),
    /// Terminal failure or a service error
    Done(GridloadError),
}

/// Poll `execution_id` until it reaches a terminal state
///
/// QUEUED and RUNNING are both pending. Waits start at
/// `initial_interval_secs`, grow by `multiplier` and are capped at
/// `max_interval_secs`. Once the backoff has no full interval left before
/// the deadline, one last check is made exactly at the deadline.
///
/// # Errors
///
/// - `RegistrationError::Failed` / `Cancelled` for those terminal states
/// - `RegistrationError::Timeout` if still pending at the deadline
/// - any error from [`QueryService::query_status`]
pub async fn wait_for_completion(
    service: &dyn QueryService,
    execution_id: &QueryExecutionId,
    polling: &PollingConfig,
) -> Result<QueryStatus> {
    let start = Instant::now();
    let deadline = start.checked_add(polling.timeout()).ok_or_else(|| {
        GridloadError::Configuration(format!(
            "athena.polling.timeout_secs {} is out of range",
            polling.timeout_secs
        ))
    })?;

    let backoff = ExponentialBuilder::default()
        .with_min_delay(polling.initial_interval())
        .with_max_delay(polling.max_interval())
        .with_factor(polling.multiplier as f32)
        .with_total_delay(Some(polling.timeout()))
        .with_max_times(usize::MAX);

    let check = || async move { check_once(service, execution_id).await };

    let result = check
        .retry(backoff)
        .when(|poll| matches!(poll, Poll::Pending(_)))
        .notify(|poll, wait: Duration| {
            if let Poll::Pending(state) = poll {
                tracing::trace!(
                    execution_id = %execution_id,
                    state = %state,
                    wait_ms = wait.as_millis() as u64,
                    "Query pending"
                );
            }
        })
        .await;

    let last_state = match result {
        Ok(status) => return Ok(succeeded(status, execution_id, start)),
        Err(Poll::Done(err)) => return Err(err),
        Err(Poll::Pending(state)) => state,
    };

    // Backoff exhausted short of the deadline
    let last_state = if Instant::now() < deadline {
        tokio::time::sleep_until(deadline).await;
        match check_once(service, execution_id).await {
            Ok(status) => return Ok(succeeded(status, execution_id, start)),
            Err(Poll::Done(err)) => return Err(err),
            Err(Poll::Pending(state)) => state,
        }
    } else {
        last_state
    };

    Err(RegistrationError::Timeout {
        execution_id: execution_id.to_string(),
        waited_secs: start.elapsed().as_secs(),
        last_state: last_state.as_str().to_string(),
    }
    .into())
}

async fn check_once(
    service: &dyn QueryService,
    execution_id: &QueryExecutionId,
) -> std::result::Result<QueryStatus, Poll> {
    let status = service
        .query_status(execution_id)
        .await
        .map_err(Poll::Done)?;

    if !status.state.is_terminal() {
        return Err(Poll::Pending(status.state));
    }

    match status.state {
        QueryState::Failed => Err(Poll::Done(
            RegistrationError::Failed {
                execution_id: execution_id.to_string(),
                reason: reason_or_default(status.reason),
            }
            .into(),
        )),
        QueryState::Cancelled => Err(Poll::Done(
            RegistrationError::Cancelled {
                execution_id: execution_id.to_string(),
                reason: reason_or_default(status.reason),
            }
            .into(),
        )),
        _ => Ok(status),
    }
}

fn succeeded(status: QueryStatus, execution_id: &QueryExecutionId, start: Instant) -> QueryStatus {
    tracing::debug!(
        execution_id = %execution_id,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Query succeeded"
    );
    status
}

fn reason_or_default(reason: Option<String>) -> String {
    reason.unwrap_or_else(|| "no reason given".to_string())
}
