//! Storage Module
//!
//! The scheduling core never talks to a database. Hosts plug their storage
//! in through two narrow traits:
//! - [`CatalogProvider`] reads one learner's catalog, in catalog order
//! - [`ScheduleSink`] durably writes one item's updated schedule
//!
//! [`InMemoryStore`] implements both and is `Send + Sync`.

mod memory;

pub use memory::InMemoryStore;

use crate::item::{Item, ItemUpdate};

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Learner has no catalog
    #[error("Learner not found: {0}")]
    LearnerNotFound(String),
    /// Item id not present in the learner's catalog
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Lock poisoned or other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Source of a learner's item catalog
pub trait CatalogProvider {
    /// All items for `learner`, in the order they were initialized
    fn load(&self, learner: &str) -> Result<Vec<Item>, StoreError>;
}

/// Durable destination for schedule updates
///
/// Implementations must not report success before the write is durable;
/// the session re-selects only after `persist` returns `Ok`.
pub trait ScheduleSink {
    fn persist(&self, learner: &str, update: &ItemUpdate) -> Result<(), StoreError>;
}

impl<T: CatalogProvider + ?Sized> CatalogProvider for &T {
    fn load(&self, learner: &str) -> Result<Vec<Item>, StoreError> {
        (**self).load(learner)
    }
}

impl<T: ScheduleSink + ?Sized> ScheduleSink for &T {
    fn persist(&self, learner: &str, update: &ItemUpdate) -> Result<(), StoreError> {
        (**self).persist(learner, update)
    }
}

impl<T: CatalogProvider + ?Sized> CatalogProvider for std::sync::Arc<T> {
    fn load(&self, learner: &str) -> Result<Vec<Item>, StoreError> {
        (**self).load(learner)
    }
}

impl<T: ScheduleSink + ?Sized> ScheduleSink for std::sync::Arc<T> {
    fn persist(&self, learner: &str, update: &ItemUpdate) -> Result<(), StoreError> {
        (**self).persist(learner, update)
    }
}
