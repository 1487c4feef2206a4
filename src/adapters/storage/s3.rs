//! S3 construction of [`ObjectStorage`]

use super::{ObjectStorage, StorageFactory};
use crate::config::StorageConfig;
use crate::domain::errors::StorageError;
use object_store::aws::AmazonS3Builder;
use object_store::{ObjectStore, RetryConfig};
use secrecy::ExposeSecret;
use std::sync::Arc;

impl ObjectStorage {
    /// Build an S3-backed handle for `bucket`
    ///
    /// Credentials and region come from the standard AWS environment unless
    /// the storage configuration overrides them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the client cannot be built.
    pub fn for_bucket(config: &StorageConfig, bucket: &str) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_retry(RetryConfig::default());

        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(config.allow_http);
        }

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder
                .with_access_key_id(key_id)
                .with_secret_access_key(secret.expose_secret().as_ref());
        }

        let store: Arc<dyn ObjectStore> = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::InvalidConfig(e.to_string()))?,
        );

        Ok(Self::from_store(bucket, store))
    }
}

/// [`StorageFactory`] producing S3 handles from one storage configuration
#[derive(Debug, Clone)]
pub struct S3StorageFactory {
    config: StorageConfig,
}

impl S3StorageFactory {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

impl StorageFactory for S3StorageFactory {
    fn open(&self, bucket: &str) -> Result<ObjectStorage, StorageError> {
        ObjectStorage::for_bucket(&self.config, bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_for_bucket_with_static_credentials() {
        let config = StorageConfig {
            region: Some("eu-west-2".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            allow_http: true,
            access_key_id: Some("minio".to_string()),
            secret_access_key: Some(secret_string("minio-secret")),
        };

        let storage = ObjectStorage::for_bucket(&config, "met-office-data").unwrap();
        assert_eq!(storage.bucket(), "met-office-data");
    }

    #[test]
    fn test_factory_opens_requested_bucket() {
        let factory = S3StorageFactory::new(StorageConfig {
            region: Some("eu-west-2".to_string()),
            ..Default::default()
        });
        let storage = factory.open("other-bucket").unwrap();
        assert_eq!(storage.bucket(), "other-bucket");
    }
}
