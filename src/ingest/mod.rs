//! Record ingestion
//!
//! Turns a credential and raw JSON text into a stored animal:
//! authenticate, parse, validate, assign an id, attach the owner, persist.

pub mod ids;
pub mod pipeline;

pub use ids::{IdStrategy, next_sequential_id};
pub use pipeline::AnimalIngestor;

use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::AnimalValidationError;

/// Default number of ids tried before giving up on a creation
pub const DEFAULT_MAX_ID_ATTEMPTS: usize = 8;

/// Errors that can occur while creating a record
#[derive(Error, Debug)]
pub enum IngestError {
    /// Credential rejected by the auth verifier
    #[error("Unauthorized")]
    Unauthorized,

    /// Input text is not JSON
    #[error("Invalid JSON string")]
    InvalidJson,

    /// Input is JSON but not a valid animal
    #[error(transparent)]
    Schema(#[from] AnimalValidationError),

    /// Credential accepted without an identity behind it
    #[error("User ID could not be retrieved from auth token")]
    IdentityResolution,

    /// Every candidate id was already taken
    #[error("No free record id after {attempts} attempts")]
    IdExhausted { attempts: usize },

    /// Storage error wrapper
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IngestError {
    /// Whether the caller caused this and can fix it by resending
    ///
    /// Rejections are reported back as an error payload; everything else is a
    /// failure of the registry or its collaborators.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IngestError::Unauthorized | IngestError::InvalidJson | IngestError::Schema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_classification() {
        assert_eq!(IngestError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(IngestError::InvalidJson.to_string(), "Invalid JSON string");

        let schema = IngestError::from(AnimalValidationError::NoImages);
        assert_eq!(schema.to_string(), "invalid images: must not be empty");
        assert!(schema.is_rejection());

        assert!(!IngestError::IdentityResolution.is_rejection());
        assert!(!IngestError::IdExhausted { attempts: 8 }.is_rejection());
        assert!(!IngestError::from(StorageError::IoError("disk".to_string())).is_rejection());
    }
}
