//! Animal loading functionality
//!
//! Reads the record collection from a storage backend and answers the
//! exact-match lookups (by id, by owner). All operations are read-only.

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::RECORD_EXTENSION;
use crate::models::Animal;
use crate::storage::{StorageBackend, StorageError};

/// Animal loader that uses a storage backend
pub struct AnimalLoader<B: StorageBackend> {
    storage: B,
    collection: String,
}

impl<B: StorageBackend> AnimalLoader<B> {
    /// Create a new loader over `collection` in the given storage backend
    pub fn new(storage: B, collection: impl Into<String>) -> Self {
        Self {
            storage,
            collection: collection.into(),
        }
    }

    /// Collection path records are read from
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Read and parse every record file in the collection
    ///
    /// A collection directory that does not exist yet is an empty collection.
    /// Files that cannot be read or parsed as `T` are skipped with a warning,
    /// so one damaged record does not hide the rest. Ordering is whatever the
    /// backend lists.
    pub async fn list_records<T: DeserializeOwned>(&self) -> Result<Vec<T>, StorageError> {
        if !self.storage.dir_exists(&self.collection).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let files = self.storage.list_files(&self.collection).await?;
        for file_name in files {
            if !file_name.ends_with(RECORD_EXTENSION) {
                continue;
            }
            let file_path = format!("{}/{}", self.collection, file_name);
            match self.load_record(&file_path).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Failed to load record from {}: {}", file_path, e);
                }
            }
        }

        info!(
            "Loaded {} records from collection {}",
            records.len(),
            self.collection
        );
        Ok(records)
    }

    /// All animals in the collection
    pub async fn list_all(&self) -> Result<Vec<Animal>, StorageError> {
        self.list_records().await
    }

    /// First animal whose id is `id`
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Animal>, StorageError> {
        let animals = self.list_all().await?;
        Ok(animals.into_iter().find(|animal| animal.id == id))
    }

    /// Animals created by `user_id`
    ///
    /// Returns `None` rather than an empty list when the user owns nothing.
    pub async fn get_by_owner(&self, user_id: &str) -> Result<Option<Vec<Animal>>, StorageError> {
        let owned: Vec<Animal> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|animal| animal.is_owned_by(user_id))
            .collect();

        Ok(if owned.is_empty() { None } else { Some(owned) })
    }

    async fn load_record<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorageError> {
        let content = self.storage.read_file(path).await?;
        serde_json::from_slice(&content)
            .map_err(|e| StorageError::SerializationError(format!("Failed to parse JSON: {}", e)))
    }
}
