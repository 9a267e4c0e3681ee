//! Animal saving functionality
//!
//! Serializes records to JSON and writes them to a storage backend.

use serde::Serialize;
use tracing::info;

use super::record_path;
use crate::models::Animal;
use crate::storage::{StorageBackend, StorageError};

/// Animal saver that uses a storage backend
pub struct AnimalSaver<B: StorageBackend> {
    storage: B,
    collection: String,
}

impl<B: StorageBackend> AnimalSaver<B> {
    /// Create a new saver writing into `collection`
    pub fn new(storage: B, collection: impl Into<String>) -> Self {
        Self {
            storage,
            collection: collection.into(),
        }
    }

    /// Write `record` as pretty-printed JSON to `path`, replacing what is there
    pub async fn write_record<T: Serialize>(&self, path: &str, record: &T) -> Result<(), StorageError> {
        let content = to_json(record)?;
        self.storage.write_file(path, &content).await
    }

    /// Store a new animal at the path derived from its id
    ///
    /// Fails with `StorageError::AlreadyExists` when a record with the same id
    /// is already stored. Returns the path written.
    pub async fn create_record(&self, animal: &Animal) -> Result<String, StorageError> {
        let path = record_path(&self.collection, &animal.id);
        let content = to_json(animal)?;

        self.storage.write_file_new(&path, &content).await?;

        info!(
            "Saved animal '{}' ({}) to {}",
            animal.name, animal.id, path
        );
        Ok(path)
    }
}

fn to_json<T: Serialize>(record: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(record).map_err(|e| {
        StorageError::SerializationError(format!("Failed to serialize record: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalEvent, NewAnimal, UserId};
    use crate::storage::memory::MemoryStorageBackend;
    use std::sync::Arc;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn animal(id: &str) -> Animal {
        NewAnimal {
            name: "Owl".to_string(),
            sci_name: "Strix aluco".to_string(),
            description: vec!["nocturnal".to_string(), "brown".to_string()],
            images: vec!["owl.png".to_string()],
            events: vec![AnimalEvent {
                name: "Call heard".to_string(),
                date: "11/02/2022".to_string(),
                url: "http://owl".to_string(),
            }],
        }
        .into_animal(id, &UserId::new("u1"))
    }

    #[test]
    fn test_create_record_writes_camel_case_json() {
        let rt = runtime();
        rt.block_on(async {
            let storage = Arc::new(MemoryStorageBackend::new());
            let saver = AnimalSaver::new(Arc::clone(&storage), "data/animals");

            let path = saver.create_record(&animal("5")).await.unwrap();
            assert_eq!(path, "data/animals/5.json");

            let bytes = storage.read_file(&path).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["id"], "5");
            assert_eq!(json["sciName"], "Strix aluco");
            assert_eq!(json["createdByUser"], "u1");
        });
    }

    #[test]
    fn test_create_record_never_overwrites() {
        let rt = runtime();
        rt.block_on(async {
            let storage = Arc::new(MemoryStorageBackend::new());
            let saver = AnimalSaver::new(Arc::clone(&storage), "data/animals");

            saver.create_record(&animal("1")).await.unwrap();
            let mut other = animal("1");
            other.name = "Impostor".to_string();
            let result = saver.create_record(&other).await;
            assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

            let bytes = storage.read_file("data/animals/1.json").await.unwrap();
            let stored: Animal = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(stored.name, "Owl");
        });
    }

    #[test]
    fn test_write_record_replaces() {
        let rt = runtime();
        rt.block_on(async {
            let storage = Arc::new(MemoryStorageBackend::new());
            let saver = AnimalSaver::new(Arc::clone(&storage), "data/animals");

            saver.write_record("data/animals/1.json", &animal("1")).await.unwrap();
            let mut renamed = animal("1");
            renamed.name = "Tawny owl".to_string();
            saver.write_record("data/animals/1.json", &renamed).await.unwrap();

            let bytes = storage.read_file("data/animals/1.json").await.unwrap();
            let stored: Animal = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(stored.name, "Tawny owl");
        });
    }
}
