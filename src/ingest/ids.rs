//! Record id assignment

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Animal;

/// How new records are named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Decimal counter continuing after the largest id in the collection
    #[default]
    Sequential,
    /// Random v4 UUID
    Uuid,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(IdStrategy::Sequential),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(format!(
                "unknown id strategy `{}`; expected sequential|uuid",
                other
            )),
        }
    }
}

/// The first sequential id not below either the collection size or any
/// numeric id already present
///
/// On a collection written only by the sequential strategy this is
/// `count + 1`; gaps or foreign ids never make it reuse a taken number.
/// An id of `u64::MAX` has no successor and is left out of the maximum.
pub fn next_sequential_id(existing: &[Animal]) -> u64 {
    let count = existing.len() as u64;
    existing
        .iter()
        .filter_map(|animal| animal.id.parse::<u64>().ok())
        .filter_map(|id| id.checked_add(1))
        .max()
        .unwrap_or(1)
        .max(count + 1)
}

/// Stream of candidate ids for one creation
#[derive(Debug, Clone)]
pub(crate) struct IdCandidates {
    strategy: IdStrategy,
    next: Option<u64>,
}

impl IdCandidates {
    pub(crate) fn new(strategy: IdStrategy, existing: &[Animal]) -> Self {
        Self {
            strategy,
            next: Some(next_sequential_id(existing)),
        }
    }

    /// Next id to try, or `None` once the sequential range is used up
    pub(crate) fn next_id(&mut self) -> Option<String> {
        match self.strategy {
            IdStrategy::Sequential => {
                let id = self.next?;
                self.next = id.checked_add(1);
                Some(id.to_string())
            }
            IdStrategy::Uuid => Some(Uuid::new_v4().to_string()),
        }
    }
}
