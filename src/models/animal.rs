//! Animal record model
//!
//! `Animal` is the persisted shape. `NewAnimal` is the typed candidate the
//! validator produces from client input; it has no id and no owner, and is
//! turned into an `Animal` only by the ingestion pipeline.

use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Something that happened to an animal (a sighting, a birth, an article)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimalEvent {
    pub name: String,
    /// Calendar date as `mm/dd/yyyy`
    pub date: String,
    pub url: String,
}

/// A persisted animal record
///
/// Serialized with camelCase keys (`sciName`, `createdByUser`), which is the
/// on-disk format of the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    /// System-assigned, unique within the collection
    pub id: String,
    pub name: String,
    /// Scientific (binomial) name
    pub sci_name: String,
    pub description: Vec<String>,
    /// Opaque image references
    pub images: Vec<String>,
    pub events: Vec<AnimalEvent>,
    /// Identity confirmed by the auth verifier when the record was created
    pub created_by_user: String,
}

impl Animal {
    /// Whether `user` created this record
    pub fn is_owned_by(&self, user: &str) -> bool {
        self.created_by_user == user
    }
}

/// A validated animal that has not been assigned an id or owner yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnimal {
    pub name: String,
    pub sci_name: String,
    pub description: Vec<String>,
    pub images: Vec<String>,
    pub events: Vec<AnimalEvent>,
}

impl NewAnimal {
    /// Attach the system-assigned fields
    pub fn into_animal(self, id: impl Into<String>, owner: &UserId) -> Animal {
        Animal {
            id: id.into(),
            name: self.name,
            sci_name: self.sci_name,
            description: self.description,
            images: self.images,
            events: self.events,
            created_by_user: owner.as_str().to_string(),
        }
    }
}
