//! In-memory catalog store
//!
//! Keeps every learner's catalog behind one mutex. Intended for tests and
//! for hosts that load catalogs from elsewhere and only need a shared,
//! thread-safe cache.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{CatalogProvider, ScheduleSink, StoreError};
use crate::item::{Item, ItemUpdate};

/// Mutex-guarded map of learner -> catalog
#[derive(Debug, Default)]
pub struct InMemoryStore {
    catalogs: Mutex<BTreeMap<String, Vec<Item>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog, returning false if the learner already had one
    ///
    /// An existing catalog is never replaced: a learner's item set is fixed
    /// once initialized.
    pub fn insert_catalog(&self, learner: &str, items: Vec<Item>) -> Result<bool, StoreError> {
        let mut catalogs = self.lock()?;
        if catalogs.contains_key(learner) {
            return Ok(false);
        }
        catalogs.insert(learner.to_string(), items);
        Ok(true)
    }

    /// Learners with a catalog, sorted by name
    pub fn learners(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    /// Copy of one item as currently stored
    pub fn get_item(&self, learner: &str, item_id: &str) -> Result<Option<Item>, StoreError> {
        let catalogs = self.lock()?;
        let items = catalogs
            .get(learner)
            .ok_or_else(|| StoreError::LearnerNotFound(learner.to_string()))?;
        Ok(items.iter().find(|item| item.id == item_id).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<Item>>>, StoreError> {
        self.catalogs
            .lock()
            .map_err(|_| StoreError::Backend("Catalog lock poisoned".into()))
    }
}

impl CatalogProvider for InMemoryStore {
    fn load(&self, learner: &str) -> Result<Vec<Item>, StoreError> {
        self.lock()?
            .get(learner)
            .cloned()
            .ok_or_else(|| StoreError::LearnerNotFound(learner.to_string()))
    }
}

impl ScheduleSink for InMemoryStore {
    fn persist(&self, learner: &str, update: &ItemUpdate) -> Result<(), StoreError> {
        let mut catalogs = self.lock()?;
        let items = catalogs
            .get_mut(learner)
            .ok_or_else(|| StoreError::LearnerNotFound(learner.to_string()))?;
        let item = items
            .iter_mut()
            .find(|item| item.id == update.item_id)
            .ok_or_else(|| StoreError::ItemNotFound(update.item_id.clone()))?;
        update.apply_to(item);
        Ok(())
    }
}
