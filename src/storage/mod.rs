//! Storage backend abstraction
//!
//! Defines the StorageBackend trait and implementations for different storage systems:
//! - FileSystemStorageBackend: Native file system, one file per record
//! - MemoryStorageBackend: In-process map (tests, embedding)

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("File already exists: {0}")]
    AlreadyExists(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Trait for storage backends
///
/// This trait abstracts the file and directory operations the record
/// collection needs, independently of where the bytes actually live.
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Read a file from storage
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file to storage, replacing any previous content
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Write a file that must not exist yet
    ///
    /// Returns `StorageError::AlreadyExists` when the path is taken, leaving
    /// the existing content untouched.
    async fn write_file_new(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// List files (not directories) in a directory
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    /// Check if a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Create a directory
    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Check if a directory exists
    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;
}

#[async_trait(?Send)]
impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).read_file(path).await
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        (**self).write_file(path, content).await
    }

    async fn write_file_new(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        (**self).write_file_new(path, content).await
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        (**self).list_files(dir).await
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).file_exists(path).await
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        (**self).create_dir(path).await
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).dir_exists(path).await
    }
}

// Storage backend implementations
#[cfg(feature = "native-fs")]
pub mod filesystem;

pub mod memory;
