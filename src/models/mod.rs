//! Models module
//!
//! Defines the record types stored in and returned from the collection.

pub mod animal;
pub mod user;

pub use animal::{Animal, AnimalEvent, NewAnimal};
pub use user::UserId;
