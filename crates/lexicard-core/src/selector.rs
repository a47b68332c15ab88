//! Session Selector
//!
//! Picks what the learner reads next: overdue items first (earliest due
//! first, catalog order on ties), then never-seen items in catalog order.
//! Selection never writes; graduating a new item is the caller's job.

use chrono::{DateTime, Utc};

use crate::item::Item;

/// Due and new items of a catalog at one instant
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    /// Items with `due <= now`, earliest first, catalog order on ties
    pub due: Vec<&'a Item>,
    /// Items with no due date, in catalog order
    pub new: Vec<&'a Item>,
}

/// What [`select`] picked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// An item already in the due pool
    Due(&'a Item),
    /// A never-scheduled item; the caller must set its due date to `now`
    /// before presenting it
    New(&'a Item),
}

impl<'a> Selection<'a> {
    pub fn item(&self) -> &'a Item {
        match self {
            Selection::Due(item) | Selection::New(item) => item,
        }
    }

    pub fn needs_graduation(&self) -> bool {
        matches!(self, Selection::New(_))
    }
}

/// Split a catalog into due and new items
pub fn partition(items: &[Item], now: DateTime<Utc>) -> Partition<'_> {
    let mut due: Vec<&Item> = items.iter().filter(|item| item.is_due_at(now)).collect();
    // Stable sort keeps catalog order for equal due dates
    due.sort_by_key(|item| item.schedule.due);

    let new = items.iter().filter(|item| item.is_new()).collect();

    Partition { due, new }
}

/// Pick the next item and say whether it still needs graduating
pub fn select(items: &[Item], now: DateTime<Utc>) -> Option<Selection<'_>> {
    let earliest_due = items
        .iter()
        .filter(|item| item.is_due_at(now))
        .enumerate()
        .min_by_key(|(position, item)| (item.schedule.due, *position))
        .map(|(_, item)| item);

    if let Some(item) = earliest_due {
        return Some(Selection::Due(item));
    }

    items.iter().find(|item| item.is_new()).map(Selection::New)
}

/// Next item to present, or `None` when nothing is due and nothing is new
pub fn select_next(items: &[Item], now: DateTime<Utc>) -> Option<&Item> {
    select(items, now).map(|selection| selection.item())
}

/// Items likely to be presented soon, for prefetching
///
/// Up to `due_limit` due items (same order as [`select_next`]) followed by
/// up to `new_limit` new items in catalog order, skipping ids in `exclude`.
pub fn select_upcoming<'a>(
    items: &'a [Item],
    exclude: &[&str],
    now: DateTime<Utc>,
    due_limit: usize,
    new_limit: usize,
) -> Vec<&'a Item> {
    let Partition { due, new } = partition(items, now);
    let keep = |item: &&Item| !exclude.contains(&item.id.as_str());

    due.into_iter()
        .filter(keep)
        .take(due_limit)
        .chain(new.into_iter().filter(keep).take(new_limit))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
