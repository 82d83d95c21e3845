//! Storage abstraction trait
//!
//! This module defines the Storage trait that storage backends implement.

use crate::keys::FileCategory;
use async_trait::async_trait;
use bytes::Bytes;
use staka_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Keys are `<category>/<stored_name>`; see [`crate::keys`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store an artifact and return `(storage_key, url)`
    async fn upload(
        &self,
        category: FileCategory,
        stored_name: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)>;

    /// Delete an artifact; deleting a missing key is not an error
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an artifact exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
