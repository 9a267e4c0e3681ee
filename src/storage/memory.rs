//! In-memory storage backend
//!
//! Keeps files in a process-local map keyed by normalized path. Directories
//! exist implicitly once a file is written below them, or explicitly after
//! `create_dir`.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// Storage backend that never touches the disk
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    state: Mutex<MemoryState>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently stored
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::BackendError("memory storage lock poisoned".to_string()))
    }
}

fn normalize(path: &str) -> Result<String, StorageError> {
    let trimmed = path.trim_matches('/');
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(StorageError::PermissionDenied(
            "Path traversal (..) not allowed".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn dir_prefix(dir: &str) -> String {
    if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    }
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = normalize(path)?;
        self.lock()?
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.lock()?.files.insert(key, content.to_vec());
        Ok(())
    }

    async fn write_file_new(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = normalize(path)?;
        let mut state = self.lock()?;
        if state.files.contains_key(&key) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        state.files.insert(key, content.to_vec());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_key = normalize(dir)?;
        let prefix = dir_prefix(&dir_key);
        let state = self.lock()?;

        let names: Vec<String> = state
            .files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();

        let dir_known = state.dirs.contains(&dir_key)
            || state.files.keys().any(|key| key.starts_with(&prefix));
        if names.is_empty() && !dir_known {
            return Err(StorageError::DirectoryNotFound(dir.to_string()));
        }

        Ok(names)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        Ok(self.lock()?.files.contains_key(&key))
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.lock()?.dirs.insert(key);
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        let prefix = dir_prefix(&key);
        let state = self.lock()?;
        Ok(state.dirs.contains(&key) || state.files.keys().any(|k| k.starts_with(&prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_list_only_direct_children() {
        let rt = runtime();
        rt.block_on(async {
            let backend = MemoryStorageBackend::new();
            backend.write_file("data/animals/1.json", b"{}").await.unwrap();
            backend.write_file("/data/animals/2.json", b"{}").await.unwrap();
            backend.write_file("data/animals/old/3.json", b"{}").await.unwrap();

            let mut files = backend.list_files("data/animals").await.unwrap();
            files.sort();
            assert_eq!(files, vec!["1.json".to_string(), "2.json".to_string()]);
            assert!(backend.dir_exists("data").await.unwrap());
        });
    }

    #[test]
    fn test_missing_directory() {
        let rt = runtime();
        rt.block_on(async {
            let backend = MemoryStorageBackend::new();
            let result = backend.list_files("data/animals").await;
            assert!(matches!(result, Err(StorageError::DirectoryNotFound(_))));

            backend.create_dir("data/animals").await.unwrap();
            assert!(backend.list_files("data/animals").await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_write_file_new_and_traversal() {
        let rt = runtime();
        rt.block_on(async {
            let backend = MemoryStorageBackend::new();
            backend.write_file_new("a/1.json", b"x").await.unwrap();
            assert!(matches!(
                backend.write_file_new("a/1.json", b"y").await,
                Err(StorageError::AlreadyExists(_))
            ));
            assert!(matches!(
                backend.read_file("a/../b").await,
                Err(StorageError::PermissionDenied(_))
            ));
            assert_eq!(backend.len(), 1);
        });
    }
}
