//! JSON deck files
//!
//! One file per learner, `<data dir>/<learner>.json`. Every persist rewrites
//! the whole deck through a temporary file and a rename, so a crash leaves
//! either the old deck or the new one on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lexicard_core::{CatalogProvider, Item, ItemUpdate, ScheduleSink, StoreError};
use serde::{Deserialize, Serialize};

const DECK_EXTENSION: &str = "json";

/// A learner's catalog as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub learner: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

/// Directory of deck files
#[derive(Debug, Clone)]
pub struct DeckStore {
    dir: PathBuf,
}

impl DeckStore {
    /// Open (and create if needed) a deck directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        // Restrict directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a new deck; an existing one is only replaced with `overwrite`
    pub fn create(
        &self,
        learner: &str,
        items: Vec<Item>,
        overwrite: bool,
        now: DateTime<Utc>,
    ) -> Result<Deck, StoreError> {
        let path = self.path(learner)?;
        if path.exists() && !overwrite {
            return Err(StoreError::Backend(format!(
                "deck for '{learner}' already exists"
            )));
        }

        let deck = Deck {
            learner: learner.to_string(),
            created_at: now,
            items,
        };
        self.write(&deck)?;
        tracing::info!(learner, items = deck.items.len(), path = %path.display(), "Deck created");
        Ok(deck)
    }

    pub fn read(&self, learner: &str) -> Result<Deck, StoreError> {
        let path = self.path(learner)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::LearnerNotFound(learner.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Learners with a deck file, sorted by name
    pub fn learners(&self) -> Result<Vec<String>, StoreError> {
        let mut learners = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DECK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                learners.push(stem.to_string());
            }
        }
        learners.sort();
        Ok(learners)
    }

    fn path(&self, learner: &str) -> Result<PathBuf, StoreError> {
        let valid = !learner.is_empty()
            && !learner.starts_with('.')
            && learner
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::Backend(format!(
                "invalid learner name '{learner}': use letters, digits, '-', '_' or '.'"
            )));
        }
        Ok(self.dir.join(format!("{learner}.{DECK_EXTENSION}")))
    }

    fn write(&self, deck: &Deck) -> Result<(), StoreError> {
        let path = self.path(&deck.learner)?;
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(deck)?;
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl CatalogProvider for DeckStore {
    fn load(&self, learner: &str) -> Result<Vec<Item>, StoreError> {
        Ok(self.read(learner)?.items)
    }
}

impl ScheduleSink for DeckStore {
    fn persist(&self, learner: &str, update: &ItemUpdate) -> Result<(), StoreError> {
        let mut deck = self.read(learner)?;
        let item = deck
            .items
            .iter_mut()
            .find(|item| item.id == update.item_id)
            .ok_or_else(|| StoreError::ItemNotFound(update.item_id.clone()))?;
        update.apply_to(item);
        self.write(&deck)?;

        tracing::debug!(learner, item = %update.item_id, "Schedule persisted");
        Ok(())
    }
}
