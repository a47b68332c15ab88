//! Catalog initialization
//!
//! A learner's catalog is created once, from a word list, and never grows
//! or shrinks afterwards. Ids are position-based (`wordId0001`, ...) so two
//! learners initialized from the same list share ids.

use crate::item::Item;

/// Prefix of generated item ids
pub const ITEM_ID_PREFIX: &str = "wordId";

/// Id of the item at zero-based `position`
pub fn item_id(position: usize) -> String {
    format!("{}{:04}", ITEM_ID_PREFIX, position + 1)
}

/// Build a fresh catalog, one unscheduled item per non-blank word
pub fn initialize<I, S>(words: I) -> Vec<Item>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<Item> = words
        .into_iter()
        .filter_map(|word| {
            let word = word.as_ref().trim();
            (!word.is_empty()).then(|| word.to_string())
        })
        .enumerate()
        .map(|(position, word)| Item::with_id(item_id(position), word))
        .collect();

    tracing::debug!(count = items.len(), "Initialized catalog");
    items
}
