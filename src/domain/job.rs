//! Export jobs and the partition layout they write to

use crate::domain::ids::VariableName;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Load date and timestamp shared by every job of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStamp {
    load_dt: String,
    ts: String,
}

impl LoadStamp {
    /// Take the stamp for the current instant
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Take the stamp for a given instant
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use gridload::domain::LoadStamp;
    ///
    /// let stamp = LoadStamp::at(Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap());
    /// assert_eq!(stamp.load_dt(), "2024-03-09");
    /// assert_eq!(stamp.ts(), "20240309070501");
    /// ```
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            load_dt: instant.format("%Y-%m-%d").to_string(),
            ts: instant.format("%Y%m%d%H%M%S").to_string(),
        }
    }

    /// Load date, `YYYY-MM-DD`
    pub fn load_dt(&self) -> &str {
        &self.load_dt
    }

    /// Load timestamp, `YYYYMMDDHHMMSS`
    pub fn ts(&self) -> &str {
        &self.ts
    }
}

/// One variable's unit of work
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Bucket the converted object is written to
    pub bucket: String,

    /// Variable to extract
    pub variable: VariableName,

    /// Shared load stamp
    pub stamp: LoadStamp,

    /// Target database
    pub database: String,

    /// Target table
    pub table: String,
}

impl ExportJob {
    /// Create a job whose target table is named after the variable
    pub fn new(
        bucket: impl Into<String>,
        variable: VariableName,
        stamp: LoadStamp,
        database: impl Into<String>,
    ) -> Self {
        let table = variable.as_str().to_string();
        Self {
            bucket: bucket.into(),
            variable,
            stamp,
            database: database.into(),
            table,
        }
    }

    /// Build a fresh partition key for this job
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::new(&self.variable, &self.stamp, Uuid::new_v4())
    }

    /// SQL that registers this job's partition
    pub fn registration_query(&self) -> String {
        format!(
            "ALTER TABLE {}.{} ADD IF NOT EXISTS PARTITION(load_dt='{}',ts='{}');",
            self.database,
            self.table,
            self.stamp.load_dt(),
            self.stamp.ts()
        )
    }
}

/// Object key that encodes the partition columns in its path
///
/// Format: `<variable>/load_dt=<date>/ts=<timestamp>/<uuid><variable>.gz`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Build a key from its parts
    pub fn new(variable: &VariableName, stamp: &LoadStamp, id: Uuid) -> Self {
        Self(format!(
            "{var}/load_dt={dt}/ts={ts}/{id}{var}.gz",
            var = variable.as_str(),
            dt = stamp.load_dt(),
            ts = stamp.ts(),
            id = id
        ))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of a `name=value` path segment, if present
    pub fn partition_value(&self, name: &str) -> Option<&str> {
        self.0.split('/').find_map(|segment| {
            segment
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PartitionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
