//! Object storage adapter
//!
//! Source files are fetched from, and converted partitions written to, a
//! single S3 bucket through the `object_store` abstraction. Tests swap in
//! [`object_store::memory::InMemory`] via [`ObjectStorage::from_store`].

mod s3;

pub use s3::S3StorageFactory;

use crate::domain::errors::StorageError;
use bytes::Bytes;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use std::time::Instant;

/// Opens an [`ObjectStorage`] for the bucket named in a notification
pub trait StorageFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if no client can be built.
    fn open(&self, bucket: &str) -> Result<ObjectStorage, StorageError>;
}

/// Bucket-scoped object store handle
#[derive(Clone)]
pub struct ObjectStorage {
    bucket: String,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectStorage<s3://{}>", self.bucket)
    }
}

impl ObjectStorage {
    /// Wrap an existing store, e.g. an in-memory one
    pub fn from_store(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            store,
        }
    }

    /// Bucket this handle reads from and writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fetch the whole object at `key`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DownloadFailed` if the key is invalid, the
    /// object does not exist or the transfer fails.
    pub async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let download_err = |message: String| StorageError::DownloadFailed {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message,
        };

        let path = Path::parse(key).map_err(|e| download_err(e.to_string()))?;
        let start = Instant::now();
        let bytes = self
            .store
            .get(&path)
            .await
            .map_err(|e| download_err(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Downloaded object"
        );
        Ok(bytes)
    }

    /// Write `data` to `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UploadFailed` if the key is invalid or the
    /// write is rejected.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let upload_err = |message: String| StorageError::UploadFailed {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message,
        };

        let path = Path::parse(key).map_err(|e| upload_err(e.to_string()))?;
        let size = data.len();
        let start = Instant::now();
        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Uploaded object"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn storage() -> ObjectStorage {
        ObjectStorage::from_store("met-office-data", Arc::new(InMemory::new()))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let storage = storage();
        storage
            .put("air_temperature/part.gz", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        let bytes = storage.get("air_temperature/part.gz").await.unwrap();
        assert_eq!(bytes.as_ref(), b"abc");
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let err = storage().get("nope/forecast.nc").await.unwrap_err();
        match err {
            StorageError::DownloadFailed { bucket, key, .. } => {
                assert_eq!(bucket, "met-office-data");
                assert_eq!(key, "nope/forecast.nc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_put_invalid_key() {
        let err = storage()
            .put("a//b/../c", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed { .. }));
    }

    #[test]
    fn test_debug_shows_bucket() {
        assert_eq!(format!("{:?}", storage()), "ObjectStorage<s3://met-office-data>");
    }
}
