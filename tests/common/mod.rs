//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use gridload::adapters::athena::{QueryRequest, QueryService, QueryState, QueryStatus};
use gridload::adapters::storage::{ObjectStorage, StorageFactory};
use gridload::config::{AthenaConfig, GridloadConfig, PollingConfig, SourceConfig};
use gridload::core::dataset::{Dataset, DatasetReader, Dimension, Values, Variable};
use gridload::domain::errors::StorageError;
use gridload::domain::{GridloadError, QueryExecutionId, Result};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const BUCKET: &str = "met-office-data";
pub const SOURCE_KEY: &str = "forecasts/2024/ukv forecast.nc";
pub const SOURCE_BYTES: &[u8] = b"CDF\x01 not really a forecast";

/// SNS-wrapped S3 event for `key` (as S3 sends it, `+` for spaces)
pub fn sns_event(bucket: &str, key: &str) -> String {
    let s3_event = json!({
        "Records": [{
            "s3": {
                "bucket": { "name": bucket },
                "object": { "key": key.replace(' ', "+") }
            }
        }]
    });
    json!({ "Records": [{ "Sns": { "Message": s3_event.to_string() } }] }).to_string()
}

/// Hands every bucket out of one shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub store: Arc<InMemory>,
}

impl MemoryStorage {
    pub async fn with_source() -> Self {
        let storage = Self::default();
        storage
            .store
            .put(
                &ObjectPath::parse(SOURCE_KEY).unwrap(),
                PutPayload::from_static(SOURCE_BYTES),
            )
            .await
            .unwrap();
        storage
    }

    /// All keys except the source object, sorted
    pub async fn written_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .store
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        keys.retain(|k| k != SOURCE_KEY);
        keys.sort();
        keys
    }

    pub async fn read(&self, key: &str) -> Vec<u8> {
        self.store
            .get(&ObjectPath::parse(key).unwrap())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
            .to_vec()
    }
}

impl StorageFactory for MemoryStorage {
    fn open(&self, bucket: &str) -> std::result::Result<ObjectStorage, StorageError> {
        let store: Arc<dyn ObjectStore> = self.store.clone();
        Ok(ObjectStorage::from_store(bucket, store))
    }
}

/// Returns a fixed dataset after checking the scratch copy
pub struct FixtureReader {
    dataset: Dataset,
    pub seen: Mutex<Vec<PathBuf>>,
}

impl FixtureReader {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl DatasetReader for FixtureReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        let contents = std::fs::read(path)?;
        if contents != SOURCE_BYTES {
            return Err(GridloadError::Dataset("unexpected scratch contents".to_string()));
        }
        Ok(self.dataset.clone())
    }
}

/// Reader that always fails, as for a corrupt file
pub struct BrokenReader;

impl DatasetReader for BrokenReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        Err(GridloadError::Dataset(format!(
            "Failed to open {}: not a NetCDF file",
            path.display()
        )))
    }
}

/// How a table's registration query should end
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    Fail,
    Hang,
    /// `query_status` panics
    Panic,
}

/// Query service double: each query reports RUNNING once, then its outcome
#[derive(Default)]
pub struct ScriptedQueries {
    outcomes: HashMap<String, Outcome>,
    pub requests: Mutex<Vec<QueryRequest>>,
    polls: Mutex<HashMap<String, usize>>,
}

impl ScriptedQueries {
    pub fn with_outcome(mut self, table: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(table.to_string(), outcome);
        self
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn outcome_for(&self, query: &str) -> Outcome {
        self.outcomes
            .iter()
            .find(|(table, _)| query.contains(&format!(".{table} ")))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(Outcome::Succeed)
    }
}

#[async_trait]
impl QueryService for ScriptedQueries {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryExecutionId> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(QueryExecutionId::new(format!("q-{}", requests.len())).unwrap())
    }

    async fn query_status(&self, id: &QueryExecutionId) -> Result<QueryStatus> {
        let index: usize = id.as_str()[2..].parse().unwrap();
        let query = self.requests.lock().unwrap()[index - 1].query.clone();
        let outcome = self.outcome_for(&query);
        if let Outcome::Panic = outcome {
            panic!("status endpoint exploded for {id}");
        }

        let mut polls = self.polls.lock().unwrap();
        let count = polls.entry(id.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return Ok(QueryStatus::new(QueryState::Running));
        }

        Ok(match outcome {
            Outcome::Succeed | Outcome::Panic => QueryStatus::new(QueryState::Succeeded),
            Outcome::Fail => QueryStatus::new(QueryState::Failed).with_reason("HIVE_METASTORE_ERROR"),
            Outcome::Hang => QueryStatus::new(QueryState::Running),
        })
    }
}

/// A 2 x 3 x 2 (time, latitude, longitude) forecast with coordinates
pub fn forecast_dataset() -> Dataset {
    let dims = || {
        vec![
            Dimension::new("time", 2),
            Dimension::new("latitude", 3),
            Dimension::new("longitude", 2),
        ]
    };
    let field = |base: f32| Values::F32((0..12).map(|i| base + i as f32 * 0.5).collect());
    let t0 = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();

    Dataset::new()
        .with_variable(
            Variable::new(
                "time",
                vec![Dimension::new("time", 2)],
                Values::DateTime(vec![Some(t0), Some(t0 + chrono::Duration::hours(1))]),
            )
            .unwrap(),
        )
        .with_variable(
            Variable::new(
                "latitude",
                vec![Dimension::new("latitude", 3)],
                Values::F32(vec![49.5, 50.0, 50.5]),
            )
            .unwrap(),
        )
        .with_variable(
            Variable::new(
                "longitude",
                vec![Dimension::new("longitude", 2)],
                Values::F32(vec![-3.0, -2.5]),
            )
            .unwrap(),
        )
        .with_variable(Variable::new("dew_point_temperature", dims(), field(270.0)).unwrap())
        .with_variable(Variable::new("air_temperature", dims(), field(280.0)).unwrap())
        .with_variable(Variable::new("wind_speed_of_gust", dims(), field(3.0)).unwrap())
        .with_variable(
            Variable::new(
                "visibility_in_air",
                dims(),
                Values::I32((0..12).map(|i| 10_000 + i * 100).collect()),
            )
            .unwrap(),
        )
}

/// Valid configuration with fast polling and `scratch_dir`
pub fn test_config(scratch_dir: &Path) -> GridloadConfig {
    GridloadConfig {
        source: SourceConfig {
            scratch_dir: scratch_dir.to_string_lossy().to_string(),
        },
        athena: AthenaConfig {
            database: "weather".to_string(),
            output_location: "s3://athena-results/gridload/".to_string(),
            workgroup: None,
            polling: PollingConfig {
                initial_interval_secs: 1,
                max_interval_secs: 2,
                multiplier: 2.0,
                timeout_secs: 10,
            },
        },
        ..Default::default()
    }
}
