//! Animal Registry - validated creation and lookup of animal records
//!
//! Provides:
//! - Schema validation of untrusted animal JSON
//! - An ingestion pipeline assigning ids and owners from verified credentials
//! - Exact-match lookups over the record collection
//! - Storage backends (file system, in-memory) and credential verifiers

pub mod api;
pub mod auth;
pub mod config;
pub mod ingest;
pub mod model;
pub mod models;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use storage::memory::MemoryStorageBackend;
pub use storage::{StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;

pub use api::{AnimalApi, ApiMessage, ApiPayload};
pub use auth::{AuthError, AuthVerifier, JwtAuthVerifier, JwtConfig, StaticTokenVerifier};
pub use config::{ConfigError, RegistryConfig};
pub use ingest::{AnimalIngestor, IdStrategy, IngestError};
pub use model::{AnimalLoader, AnimalSaver};
pub use models::{Animal, AnimalEvent, NewAnimal, UserId};
pub use validation::{AnimalValidationError, parse_animal, validate_animal};
