//! Schedule - spaced repetition state of one item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::fsrs::LearningState;

/// FSRS state of a single item
///
/// `due` is absent only for items that have never been scheduled. An item
/// graduated into the due pool by the session keeps `state == New` and
/// `repetition_count == 0` until its first grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// When the item becomes eligible for review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    /// Memory stability (days until recall probability drops to 90%)
    #[serde(default)]
    pub stability: f64,
    /// Inherent difficulty (1.0 = easy, 10.0 = hard; 0.0 before first review)
    #[serde(default)]
    pub difficulty: f64,
    /// Lifecycle stage
    #[serde(default)]
    pub state: LearningState,
    /// Number of grades applied
    #[serde(default)]
    pub repetition_count: u32,
    /// Times the item was forgotten after graduating
    #[serde(default)]
    pub lapses: u32,
    /// When the last grade was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Fresh schedule for a catalog entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Never scheduled
    pub fn is_new(&self) -> bool {
        self.due.is_none()
    }

    /// Eligible for review at `now`
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.due.is_some_and(|due| due <= now)
    }

    /// Move a new item into the due pool
    pub fn graduate(&self, now: DateTime<Utc>) -> Self {
        Self {
            due: Some(now),
            ..self.clone()
        }
    }

    /// Check the numeric fields and lifecycle invariants
    pub fn validate(&self) -> Result<(), SchedulerError> {
        for (field, value) in [("stability", self.stability), ("difficulty", self.difficulty)] {
            if !value.is_finite() {
                return Err(SchedulerError::InvalidSchedule(format!(
                    "{} is not finite ({})",
                    field, value
                )));
            }
            if value < 0.0 {
                return Err(SchedulerError::InvalidSchedule(format!(
                    "{} is negative ({})",
                    field, value
                )));
            }
        }

        if self.due.is_none()
            && (self.state != LearningState::New || self.repetition_count > 0)
        {
            return Err(SchedulerError::InvalidSchedule(format!(
                "no due date but state is {} with {} repetitions",
                self.state, self.repetition_count
            )));
        }

        Ok(())
    }
}
