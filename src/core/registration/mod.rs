//! Partition registration
//!
//! After a variable's object is uploaded, its partition is added to the
//! variable's table with an `ALTER TABLE .. ADD IF NOT EXISTS PARTITION`
//! statement, and the execution is polled until it settles.

pub mod poller;

pub use poller::wait_for_completion;

use crate::adapters::athena::{QueryRequest, QueryService};
use crate::config::AthenaConfig;
use crate::domain::ids::QueryExecutionId;
use crate::domain::{ExportJob, Result};

/// Query request that registers `job`'s partition
pub fn registration_request(job: &ExportJob, athena: &AthenaConfig) -> QueryRequest {
    QueryRequest {
        query: job.registration_query(),
        database: job.database.clone(),
        output_location: athena.output_location.clone(),
        workgroup: athena.workgroup.clone(),
    }
}

/// Submit the registration statement for `job` and wait for it to succeed
///
/// # Errors
///
/// Returns a `RegistrationError` if submission fails, the query ends FAILED
/// or CANCELLED, or it is still pending at the polling deadline.
pub async fn register_partition(
    service: &dyn QueryService,
    job: &ExportJob,
    athena: &AthenaConfig,
) -> Result<QueryExecutionId> {
    let request = registration_request(job, athena);
    let execution_id = service.start_query(&request).await?;

    tracing::debug!(
        variable = %job.variable,
        execution_id = %execution_id,
        query = %request.query,
        "Submitted partition registration"
    );

    wait_for_completion(service, &execution_id, &athena.polling).await?;
    Ok(execution_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollingConfig;
    use crate::domain::{LoadStamp, VariableName};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_registration_request() {
        let job = ExportJob::new(
            "met-office-data",
            VariableName::new("air_temperature").unwrap(),
            LoadStamp::at(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            "weather",
        );
        let athena = AthenaConfig {
            database: "weather".to_string(),
            output_location: "s3://athena-results/gridload/".to_string(),
            workgroup: Some("etl".to_string()),
            polling: PollingConfig::default(),
        };

        let request = registration_request(&job, &athena);
        assert_eq!(
            request.query,
            "ALTER TABLE weather.air_temperature ADD IF NOT EXISTS \
             PARTITION(load_dt='2024-01-02',ts='20240102030405');"
        );
        assert_eq!(request.database, "weather");
        assert_eq!(request.output_location, "s3://athena-results/gridload/");
        assert_eq!(request.workgroup.as_deref(), Some("etl"));
    }
}
