//! Operations offered to transport layers
//!
//! Each operation reports `(ok, payload)` where the payload serializes to the
//! wire shape directly: `{"success": ...}`, `{"error": ...}`, or the
//! record(s). Caller mistakes are reported in the payload; registry failures
//! are returned as `Err`.

use serde::{Deserialize, Serialize};

use crate::auth::AuthVerifier;
use crate::config::RegistryConfig;
use crate::ingest::{AnimalIngestor, IngestError};
use crate::model::AnimalLoader;
use crate::models::Animal;
use crate::storage::{StorageBackend, StorageError};

pub const ANIMAL_CREATED: &str = "Animal created";
pub const ANIMAL_NOT_FOUND: &str = "Animal not found";
pub const NO_ANIMALS_FOUND: &str = "No animals found";

/// Outcome message of a write operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiMessage {
    Success { success: String },
    Error { error: String },
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        ApiMessage::Success {
            success: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiMessage::Error {
            error: message.into(),
        }
    }
}

/// Result of a lookup: the value, or an error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiPayload<T> {
    Found(T),
    Error { error: String },
}

impl<T> ApiPayload<T> {
    pub fn error(message: impl Into<String>) -> Self {
        ApiPayload::Error {
            error: message.into(),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            ApiPayload::Found(value) => Some(value),
            ApiPayload::Error { .. } => None,
        }
    }
}

/// Registry entry points over one collection
pub struct AnimalApi<B: StorageBackend, A: AuthVerifier> {
    ingestor: AnimalIngestor<B, A>,
}

impl<B: StorageBackend + Clone, A: AuthVerifier> AnimalApi<B, A> {
    pub fn new(storage: B, auth: A, config: &RegistryConfig) -> Self {
        Self {
            ingestor: AnimalIngestor::from_config(storage, auth, config),
        }
    }
}

#[cfg(feature = "native-fs")]
impl AnimalApi<crate::storage::filesystem::FileSystemStorageBackend, crate::auth::JwtAuthVerifier> {
    /// Registry over files in `config.data_dir`, authenticating with `[jwt]`
    pub fn open(config: &RegistryConfig) -> Result<Self, crate::config::ConfigError> {
        config.validate()?;
        let storage = crate::storage::filesystem::FileSystemStorageBackend::new(&config.data_dir);
        let auth = config.jwt_verifier()?;
        Ok(Self::new(storage, auth, config))
    }
}

impl<B: StorageBackend, A: AuthVerifier> AnimalApi<B, A> {
    pub fn from_ingestor(ingestor: AnimalIngestor<B, A>) -> Self {
        Self { ingestor }
    }

    fn loader(&self) -> &AnimalLoader<B> {
        self.ingestor.loader()
    }

    /// Create an animal from raw JSON on behalf of the credential's user
    ///
    /// Returns `(true, {"success": "Animal created"})`, or `(false, {"error": reason})`
    /// for an unauthorized credential, malformed JSON or a schema violation.
    /// Identity resolution and storage failures are returned as `Err`.
    pub async fn create_animal(
        &self,
        credential: &str,
        raw_json: &str,
    ) -> Result<(bool, ApiMessage), IngestError> {
        match self.ingestor.create_animal(credential, raw_json).await {
            Ok(_) => Ok((true, ApiMessage::success(ANIMAL_CREATED))),
            Err(e) if e.is_rejection() => Ok((false, ApiMessage::error(e.to_string()))),
            Err(e) => Err(e),
        }
    }

    /// Every animal in the collection
    pub async fn get_all_animals(&self) -> Result<Vec<Animal>, StorageError> {
        self.loader().list_all().await
    }

    /// The animal with `id`, or `(false, {"error": "Animal not found"})`
    pub async fn get_one_animal(&self, id: &str) -> Result<(bool, ApiPayload<Animal>), StorageError> {
        Ok(match self.loader().get_by_id(id).await? {
            Some(animal) => (true, ApiPayload::Found(animal)),
            None => (false, ApiPayload::error(ANIMAL_NOT_FOUND)),
        })
    }

    /// Animals created by `user_id`, or `(false, {"error": "No animals found"})`
    pub async fn get_animals_by_user(
        &self,
        user_id: &str,
    ) -> Result<(bool, ApiPayload<Vec<Animal>>), StorageError> {
        Ok(match self.loader().get_by_owner(user_id).await? {
            Some(animals) => (true, ApiPayload::Found(animals)),
            None => (false, ApiPayload::error(NO_ANIMALS_FOUND)),
        })
    }
}
