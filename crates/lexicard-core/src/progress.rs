//! Learner progress reporting
//!
//! Read-only summaries for dashboards. Nothing here feeds back into
//! scheduling; in particular the mastery threshold is a display choice.

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Default difficulty below which a reviewed item counts as mastered
pub const DEFAULT_MASTERY_THRESHOLD: f64 = 5.0;

/// Progress of one learner through their catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgress {
    pub learner: String,
    /// Items in the catalog
    pub total: usize,
    /// Items graded at least once
    pub reviewed: usize,
    /// Items with a difficulty in (0, threshold)
    pub mastered: usize,
    /// Items currently due at the time of the report
    pub due: usize,
    /// reviewed / total, as a percentage (0 for an empty catalog)
    pub percent: f64,
}

impl LearnerProgress {
    pub fn from_items(
        learner: impl Into<String>,
        items: &[Item],
        mastery_threshold: f64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let total = items.len();
        let reviewed = items
            .iter()
            .filter(|item| item.schedule.last_reviewed_at.is_some())
            .count();
        // A zero difficulty means "never rated", not "trivially easy"
        let mastered = items
            .iter()
            .filter(|item| {
                let d = item.schedule.difficulty;
                d > 0.0 && d < mastery_threshold
            })
            .count();
        let due = items.iter().filter(|item| item.is_due_at(now)).count();
        let percent = if total > 0 {
            reviewed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            learner: learner.into(),
            total,
            reviewed,
            mastered,
            due,
            percent,
        }
    }

    /// Share of the catalog mastered, as a percentage
    pub fn mastered_percent(&self) -> f64 {
        if self.total > 0 {
            self.mastered as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.reviewed == self.total
    }
}

/// Sort learners by progress, most advanced first (stable on ties)
pub fn rank(mut learners: Vec<LearnerProgress>) -> Vec<LearnerProgress> {
    learners.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    learners
}
