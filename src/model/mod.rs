//! Record collection loading and saving
//!
//! Provides high-level operations for reading and writing animal records
//! using storage backends. Each record is one JSON file named after its id.

pub mod loader;
pub mod saver;

pub use loader::AnimalLoader;
pub use saver::AnimalSaver;

/// Collection path used when none is configured
pub const DEFAULT_COLLECTION: &str = "data/animals";

/// Extension of record files inside a collection
pub const RECORD_EXTENSION: &str = ".json";

/// Path of the record with `id` inside `collection`
pub fn record_path(collection: &str, id: &str) -> String {
    format!("{}/{}{}", collection.trim_end_matches('/'), id, RECORD_EXTENSION)
}
