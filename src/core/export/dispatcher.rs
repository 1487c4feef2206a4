//! Notification dispatcher - entry point of one invocation
//!
//! Resolves the triggering object, loads it once as a dataset and fans out
//! one export task per configured variable. Trigger, download and dataset
//! failures abort the dispatch; per-variable failures are collected into
//! the [`DispatchSummary`] while the other variables carry on.

use super::exporter::Exporter;
use super::summary::DispatchSummary;
use crate::adapters::athena::{AthenaClient, QueryService};
use crate::adapters::storage::{ObjectStorage, S3StorageFactory, StorageFactory};
use crate::config::GridloadConfig;
use crate::core::dataset::{Dataset, DatasetReader, NetCdfReader};
use crate::domain::{ExportJob, GridloadError, LoadStamp, Result, SourceObject};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Dispatches storage notifications to per-variable exports
pub struct Dispatcher {
    config: GridloadConfig,
    storage: Arc<dyn StorageFactory>,
    query_service: Arc<dyn QueryService>,
    reader: Arc<dyn DatasetReader>,
}

impl Dispatcher {
    /// Create a dispatcher wired to S3, Athena and the NetCDF reader
    pub async fn from_config(config: GridloadConfig) -> Self {
        let storage = Arc::new(S3StorageFactory::new(config.storage.clone()));
        let query_service = Arc::new(AthenaClient::from_env().await);
        Self::with_components(config, storage, query_service, Arc::new(NetCdfReader))
    }

    /// Create a dispatcher from explicit components
    pub fn with_components(
        config: GridloadConfig,
        storage: Arc<dyn StorageFactory>,
        query_service: Arc<dyn QueryService>,
        reader: Arc<dyn DatasetReader>,
    ) -> Self {
        Self {
            config,
            storage,
            query_service,
            reader,
        }
    }

    /// Handle a raw notification payload (SNS envelope or bare S3 event)
    ///
    /// # Errors
    ///
    /// Returns a `Trigger`, `Storage`, `Io` or `Dataset` error if the
    /// source object cannot be resolved or loaded. Per-variable failures
    /// are reported in the summary instead.
    pub async fn handle(&self, event: &str) -> Result<DispatchSummary> {
        let source = SourceObject::from_notification_str(event)?;
        self.handle_source(source).await
    }

    /// Export every configured variable of an already-resolved object
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::handle`], minus trigger parsing.
    pub async fn handle_source(&self, source: SourceObject) -> Result<DispatchSummary> {
        let start = Instant::now();
        let stamp = LoadStamp::now();
        let dry_run = self.config.application.dry_run;

        tracing::info!(
            bucket = %source.bucket,
            key = %source.key,
            load_dt = %stamp.load_dt(),
            ts = %stamp.ts(),
            dry_run,
            "Handling notification"
        );

        let storage = self.storage.open(&source.bucket)?;
        let dataset = self.load_dataset(&storage, &source).await?;

        let exporter = Arc::new(Exporter::new(
            storage,
            Arc::clone(&self.query_service),
            self.config.athena.clone(),
            dry_run,
        ));

        let variables = &self.config.export.variables;
        let mut tasks = JoinSet::new();
        for (index, variable) in variables.iter().enumerate() {
            let job = ExportJob::new(
                source.bucket.clone(),
                variable.clone(),
                stamp.clone(),
                self.config.athena.database.clone(),
            );
            let exporter = Arc::clone(&exporter);
            let dataset = Arc::clone(&dataset);

            tasks.spawn(async move {
                let result = AssertUnwindSafe(exporter.export(dataset, &job))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(GridloadError::TaskFailed(panic_message(panic))));
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<_>>> = variables.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Export task did not complete"),
            }
        }

        let mut summary =
            DispatchSummary::new(source.bucket.clone(), source.key.clone(), stamp, dry_run);
        for (variable, result) in variables.iter().zip(results) {
            let result = result.unwrap_or_else(|| {
                Err(GridloadError::TaskFailed(format!(
                    "Export task for '{variable}' did not report"
                )))
            });
            summary.add_outcome(variable.clone(), result);
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn load_dataset(
        &self,
        storage: &ObjectStorage,
        source: &SourceObject,
    ) -> Result<Arc<Dataset>> {
        let bytes = storage.get(&source.key).await?;

        let scratch = scratch_path(&self.config.source.scratch_dir, source.file_name());
        write_scratch(&scratch, &bytes).await?;

        let reader = Arc::clone(&self.reader);
        let path = scratch.clone();
        let loaded = tokio::task::spawn_blocking(move || reader.read(&path)).await;

        if let Err(e) = tokio::fs::remove_file(&scratch).await {
            tracing::warn!(path = %scratch.display(), error = %e, "Failed to remove scratch file");
        }

        let dataset = loaded
            .map_err(|e| GridloadError::TaskFailed(format!("Dataset loading task: {e}")))??;

        tracing::info!(
            key = %source.key,
            size = bytes.len(),
            variables = dataset.len(),
            "Dataset loaded"
        );
        Ok(Arc::new(dataset))
    }
}

/// Write `bytes` to `path`, leaving nothing behind on failure
async fn write_scratch(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(e) = tokio::fs::write(path, bytes).await {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partial scratch file"
                );
            }
        }
        return Err(GridloadError::Io(format!(
            "Failed to write {}: {e}",
            path.display()
        )));
    }
    Ok(())
}

/// `<scratch_dir>/<uuid><file name>`
fn scratch_path(scratch_dir: &str, file_name: &str) -> PathBuf {
    Path::new(scratch_dir).join(format!("{}{}", Uuid::new_v4(), file_name))
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("Export task panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("Export task panicked: {s}")
    } else {
        "Export task panicked".to_string()
    }
}
