//! Item module - Core types and data structures
//!
//! An [`Item`] is one word of a learner's reading catalog together with the
//! [`Schedule`] that decides when it is shown again.

mod schedule;

pub use schedule::Schedule;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ITEM
// ============================================================================

/// One flashcard in a learner's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable, opaque identifier
    pub id: String,
    /// Text shown to the learner
    pub content: String,
    /// Spaced repetition state, owned by this item
    #[serde(default)]
    pub schedule: Schedule,
    /// Again grades in a row; reset by any passing grade
    #[serde(default)]
    pub consecutive_lapse_count: u32,
}

impl Item {
    /// Create an unscheduled item with a random UUID
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), content)
    }

    /// Create an unscheduled item with a caller-chosen id
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            schedule: Schedule::new(),
            consecutive_lapse_count: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        self.schedule.is_new()
    }

    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.schedule.is_due_at(now)
    }

    /// The write a persistence sink receives for this item
    pub fn to_update(&self) -> ItemUpdate {
        ItemUpdate {
            item_id: self.id.clone(),
            schedule: self.schedule.clone(),
            consecutive_lapse_count: self.consecutive_lapse_count,
        }
    }
}

/// Scheduling state written back after a review or graduation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub item_id: String,
    pub schedule: Schedule,
    pub consecutive_lapse_count: u32,
}

impl ItemUpdate {
    /// Apply this update to a cached item with the same id
    pub fn apply_to(&self, item: &mut Item) {
        debug_assert_eq!(item.id, self.item_id);
        item.schedule = self.schedule.clone();
        item.consecutive_lapse_count = self.consecutive_lapse_count;
    }
}

// ============================================================================
// TESTS
// ============================================================================
