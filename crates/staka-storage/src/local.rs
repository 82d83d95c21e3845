use crate::keys::{is_valid_stored_name, local_url, storage_key, FileCategory};
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage rooted at the uploads directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the category directories.
    ///
    /// # Arguments
    /// * `base_path` - Root directory served at `/uploads` (e.g., "/var/lib/staka/uploads")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for category in FileCategory::ALL {
            let dir = base_path.join(category.as_str());
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage { base_path })
    }

    /// Open an existing uploads directory without creating anything.
    pub fn open(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a storage key to a filesystem path.
    ///
    /// Keys are exactly `<category>/<name>`; anything else could escape the base
    /// directory and is rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        let (category, name) = key
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidKey(format!("Malformed storage key: {}", key)))?;

        if !FileCategory::ALL.iter().any(|c| c.as_str() == category) {
            return Err(StorageError::InvalidKey(format!(
                "Unknown storage category: {}",
                category
            )));
        }
        if !is_valid_stored_name(name) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(category).join(name))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        category: FileCategory,
        stored_name: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)> {
        let key = storage_key(category, stored_name);
        let path = self.key_to_path(&key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = local_url(category, stored_name);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok((key, url))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), key = %storage_key, "Local storage delete successful");

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
