//! Backend selection.

use std::sync::Arc;

use aurelia_core::Config;

use crate::{Storage, StorageBackend, StorageError, StorageResult};

/// Build the storage backend named by configuration. Defaults to the local
/// filesystem when `STORAGE_BACKEND` is unset.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend().unwrap_or(StorageBackend::Local) {
        StorageBackend::S3 => create_s3(config).await,
        StorageBackend::Local => create_local(config).await,
    }
}

#[cfg(feature = "storage-s3")]
async fn create_s3(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let missing = |var: &str| StorageError::ConfigError(format!("{} not configured", var));

    let bucket = config.s3_bucket().ok_or_else(|| missing("S3_BUCKET"))?;
    let region = config.s3_region().ok_or_else(|| missing("S3_REGION"))?;

    let storage = crate::S3Storage::new(
        bucket.to_string(),
        region.to_string(),
        config.s3_endpoint().map(String::from),
    )
    .await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-s3"))]
async fn create_s3(_config: &Config) -> StorageResult<Arc<dyn Storage>> {
    Err(StorageError::ConfigError(
        "S3 backend requires the storage-s3 feature".to_string(),
    ))
}

#[cfg(feature = "storage-local")]
async fn create_local(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = crate::LocalStorage::new(
        config.local_storage_path().to_string(),
        config.local_storage_base_url().to_string(),
    )
    .await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-local"))]
async fn create_local(_config: &Config) -> StorageResult<Arc<dyn Storage>> {
    Err(StorageError::ConfigError(
        "Local backend requires the storage-local feature".to_string(),
    ))
}
