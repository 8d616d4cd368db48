//! The blob store gateway trait.

use async_trait::async_trait;
use aurelia_core::StorageBackend;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Gateway to an external object store.
///
/// Implemented by the S3 and local-filesystem backends. Keys are generated
/// by the caller (see [`crate::keys`]) and are unique per upload; writing
/// the same key twice lands the same bytes, so `put` is safe to retry after
/// a network error.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key` and return its public URL.
    async fn put(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Fetch the object's bytes.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object. Deleting a key that does not exist is not an
    /// error for the local backend and maps to backend semantics for S3.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    fn backend_type(&self) -> StorageBackend;
}
