//! Validation functionality
//!
//! Provides schema validation for animal records received from clients.

pub mod animal;

pub use animal::{AnimalValidationError, AnimalValidationResult, parse_animal, validate_animal};
