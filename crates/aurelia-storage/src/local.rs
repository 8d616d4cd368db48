//! Local filesystem backend.
//!
//! Objects live under a base directory, keyed by their storage key, and are
//! served by whatever fronts that directory (the `base_url`). Used in
//! development and in single-node deployments without an object store.

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::{Storage, StorageError, StorageResult};
use aurelia_core::StorageBackend;

#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create the backend, ensuring `base_path` exists.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a storage key to a path under the base directory.
    ///
    /// Keys must be relative and free of `..` components; anything else is
    /// rejected before touching the filesystem.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let key_path = Path::new(storage_key);

        let escapes = key_path.components().any(|c| {
            !matches!(c, Component::Normal(_) | Component::CurDir)
        });
        if escapes || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "key {:?} escapes the storage root",
                storage_key
            )));
        }

        Ok(self.base_path.join(key_path))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.resolve(storage_key)?;
        let size = data.len();
        let started = Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let write = async {
            let mut file = fs::File::create(&path).await?;
            file.write_all(&data).await?;
            // Flush to disk before reporting success; the ledger will soon
            // claim this object exists.
            file.sync_all().await
        };
        write.await.map_err(|e| {
            StorageError::UploadFailed(format!("write {} failed: {}", path.display(), e))
        })?;

        tracing::info!(
            backend = "local",
            key = %storage_key,
            size_bytes = size,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Stored object"
        );

        Ok(self.url_for(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(
                    backend = "local",
                    key = %storage_key,
                    size_bytes = data.len(),
                    "Read object"
                );
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "read {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(backend = "local", key = %storage_key, "Deleted object");
                Ok(())
            }
            // Deleting something already gone is a no-op.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "delete {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_download() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        let data = b"test data".to_vec();
        let url = storage
            .put("uploads/test.webp", data.clone(), "image/webp")
            .await
            .unwrap();

        // Trailing slash on the base URL must not double up.
        assert_eq!(url, "http://localhost:3000/media/uploads/test.webp");
        assert_eq!(storage.download("uploads/test.webp").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        for key in ["../../../etc/passwd", "../etc/passwd", "/etc/passwd"] {
            let result = storage.download(key).await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "key {:?} must be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        assert!(storage.delete("uploads/nonexistent.webp").await.is_ok());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        storage
            .put("uploads/exists.webp", b"test".to_vec(), "image/webp")
            .await
            .unwrap();

        assert!(storage.exists("uploads/exists.webp").await.unwrap());
        assert!(!storage.exists("uploads/missing.webp").await.unwrap());
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        let result = storage.download("uploads/missing.webp").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
