//! Animal creation pipeline

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::ids::{IdCandidates, IdStrategy};
use super::{DEFAULT_MAX_ID_ATTEMPTS, IngestError};
use crate::auth::{AuthError, AuthVerifier};
use crate::config::RegistryConfig;
use crate::model::{AnimalLoader, AnimalSaver};
use crate::models::{Animal, UserId};
use crate::storage::{StorageBackend, StorageError};
use crate::validation::parse_animal;

/// Creates animal records from untrusted input
///
/// Creations through one ingestor are serialized: the collection is read,
/// an id is chosen and the record written while holding an async lock, so
/// back-to-back creations get strictly increasing sequential ids. Writes use
/// create-new semantics, so a record stored by another process is never
/// overwritten; the next candidate id is tried instead.
pub struct AnimalIngestor<B: StorageBackend, A: AuthVerifier> {
    loader: AnimalLoader<B>,
    saver: AnimalSaver<B>,
    auth: A,
    id_strategy: IdStrategy,
    max_id_attempts: usize,
    write_lock: Mutex<()>,
}

impl<B: StorageBackend + Clone, A: AuthVerifier> AnimalIngestor<B, A> {
    /// Create an ingestor writing into `collection`
    pub fn new(storage: B, auth: A, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            loader: AnimalLoader::new(storage.clone(), collection.clone()),
            saver: AnimalSaver::new(storage, collection),
            auth,
            id_strategy: IdStrategy::default(),
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
            write_lock: Mutex::new(()),
        }
    }

    /// Create an ingestor from registry settings
    pub fn from_config(storage: B, auth: A, config: &RegistryConfig) -> Self {
        Self::new(storage, auth, config.collection.clone())
            .with_id_strategy(config.id_strategy)
            .with_max_id_attempts(config.max_id_attempts)
    }
}

impl<B: StorageBackend, A: AuthVerifier> AnimalIngestor<B, A> {
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Number of candidate ids tried per creation (at least one)
    pub fn with_max_id_attempts(mut self, attempts: usize) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    /// Read side over the same collection
    pub fn loader(&self) -> &AnimalLoader<B> {
        &self.loader
    }

    /// Validate `raw_json` and store it as an animal owned by the credential's user
    ///
    /// Nothing is written unless the credential resolves to a user and the
    /// input passes validation. Returns the stored record.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`, `InvalidJson` and `Schema` reject the request
    /// - `IdentityResolution` means the verifier accepted a token it could not
    ///   attribute to anyone
    /// - `IdExhausted` and `Storage` are failures of the collection
    pub async fn create_animal(&self, credential: &str, raw_json: &str) -> Result<Animal, IngestError> {
        let owner = self.authenticate(credential).await?;

        let candidate: Value =
            serde_json::from_str(raw_json).map_err(|_| IngestError::InvalidJson)?;

        let new_animal = parse_animal(&candidate).map_err(|e| {
            debug!("Rejected animal from {}: {}", owner, e);
            e
        })?;

        let _guard = self.write_lock.lock().await;
        let animal = self.store(new_animal.into_animal(String::new(), &owner)).await?;

        info!(
            "Created animal {} '{}' for user {}",
            animal.id, animal.name, animal.created_by_user
        );
        Ok(animal)
    }

    async fn authenticate(&self, credential: &str) -> Result<UserId, IngestError> {
        match self.auth.resolve(credential).await {
            Ok(user) => Ok(user),
            Err(AuthError::Unauthorized) => {
                warn!("Rejected create request: unauthorized credential");
                Err(IngestError::Unauthorized)
            }
            Err(AuthError::IdentityUnresolved) => {
                error!("Credential accepted but no user id could be derived from it");
                Err(IngestError::IdentityResolution)
            }
            Err(AuthError::Backend(message)) => {
                warn!("Auth verifier failed, treating as unauthorized: {}", message);
                Err(IngestError::Unauthorized)
            }
        }
    }

    /// Assign an id and write the record; caller holds the write lock
    async fn store(&self, mut animal: Animal) -> Result<Animal, IngestError> {
        let existing = match self.id_strategy {
            IdStrategy::Sequential => self.loader.list_all().await?,
            IdStrategy::Uuid => Vec::new(),
        };
        let mut candidates = IdCandidates::new(self.id_strategy, &existing);

        for _ in 0..self.max_id_attempts {
            let Some(id) = candidates.next_id() else {
                break;
            };
            animal.id = id;
            match self.saver.create_record(&animal).await {
                Ok(_) => return Ok(animal),
                Err(StorageError::AlreadyExists(path)) => {
                    warn!("Record id {} already taken ({}), trying next", animal.id, path);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(IngestError::IdExhausted {
            attempts: self.max_id_attempts,
        })
    }
}
