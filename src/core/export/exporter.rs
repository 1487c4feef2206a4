//! Per-variable export
//!
//! One [`ExportJob`] runs: select, flatten, compress, upload, register.

use crate::adapters::athena::{QueryService, QueryState};
use crate::adapters::storage::ObjectStorage;
use crate::config::AthenaConfig;
use crate::core::dataset::Dataset;
use crate::core::registration::register_partition;
use crate::core::transform::encode_gzip_csv;
use crate::core::verification::calculate_checksum;
use crate::domain::ids::{QueryExecutionId, VariableName};
use crate::domain::{ExportJob, GridloadError, Result};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Record of one successfully exported variable
#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub variable: VariableName,

    /// Object key the partition was written to
    pub key: String,

    pub rows: usize,
    pub columns: usize,

    /// Size of the gzip payload
    pub compressed_bytes: usize,

    /// SHA-256 of the gzip payload
    pub checksum: String,

    /// Registration query id; `None` in dry-run mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,

    /// Final registration state; `None` in dry-run mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_state: Option<String>,
}

/// Runs export jobs against one bucket
pub struct Exporter {
    storage: ObjectStorage,
    query_service: Arc<dyn QueryService>,
    athena: AthenaConfig,
    dry_run: bool,
}

impl Exporter {
    pub fn new(
        storage: ObjectStorage,
        query_service: Arc<dyn QueryService>,
        athena: AthenaConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            storage,
            query_service,
            athena,
            dry_run,
        }
    }

    /// Export one variable of `dataset` as a registered partition
    ///
    /// Nothing is uploaded if the variable is missing. In dry-run mode the
    /// payload is built and hashed but neither uploaded nor registered.
    ///
    /// # Errors
    ///
    /// Returns `MissingVariable`, `Conversion`, `Storage` or `Registration`
    /// errors for the step that failed.
    pub async fn export(&self, dataset: Arc<Dataset>, job: &ExportJob) -> Result<ExportReceipt> {
        let start = Instant::now();
        dataset.variable(job.variable.as_str())?;

        let variable = job.variable.clone();
        let table = tokio::task::spawn_blocking(move || encode_gzip_csv(&dataset, variable.as_str()))
            .await
            .map_err(|e| {
                GridloadError::TaskFailed(format!("Encoding task for '{}': {e}", job.variable))
            })??;

        let key = job.partition_key();
        let checksum = calculate_checksum(&table.bytes);
        let compressed_bytes = table.bytes.len();

        tracing::debug!(
            variable = %job.variable,
            rows = table.rows,
            columns = table.columns,
            compressed_bytes,
            "Encoded variable"
        );

        let (execution_id, query_state) = if self.dry_run {
            tracing::info!(
                variable = %job.variable,
                key = %key,
                "Dry run: skipping upload and registration"
            );
            (None, None)
        } else {
            self.storage
                .put(key.as_str(), Bytes::from(table.bytes))
                .await?;
            let execution_id =
                register_partition(self.query_service.as_ref(), job, &self.athena).await?;
            (Some(execution_id), Some(QueryState::Succeeded))
        };

        crate::log_variable_export!(
            job.variable,
            key,
            table.rows,
            start.elapsed().as_millis() as u64
        );

        Ok(ExportReceipt {
            variable: job.variable.clone(),
            key: key.to_string(),
            rows: table.rows,
            columns: table.columns,
            compressed_bytes,
            checksum,
            execution_id: execution_id.as_ref().map(QueryExecutionId::to_string),
            query_state: query_state.map(|s| s.as_str().to_string()),
        })
    }
}
