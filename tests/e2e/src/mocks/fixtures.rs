//! Test Data Factory
//!
//! Builds catalogs and schedules in known states:
//! - Fresh catalogs from word lists
//! - Items already due, overdue, or scheduled in the future
//! - Pre-built scenarios for common test cases

use chrono::{DateTime, Duration, TimeZone, Utc};
use lexicard_core::{catalog, Grade, Item, LearningState, Schedule, Scheduler};

/// Factory for creating test data
///
/// Timestamps are fixed so tests never depend on the wall clock.
///
/// # Example
///
/// ```rust,ignore
/// let now = TestDataFactory::now();
/// let items = vec![
///     TestDataFactory::new_item("a"),
///     TestDataFactory::due_item("b", now - Duration::seconds(10)),
/// ];
/// ```
pub struct TestDataFactory;

/// A named catalog with the instant it should be evaluated at
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub items: Vec<Item>,
    pub now: DateTime<Utc>,
    pub description: String,
}

impl TestDataFactory {
    /// Fixed reference instant
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    /// Sight words used for catalog fixtures
    pub fn words(count: usize) -> Vec<String> {
        const WORDS: [&str; 12] = [
            "the", "and", "a", "to", "said", "in", "he", "I", "of", "it", "was", "you",
        ];
        (0..count)
            .map(|i| match WORDS.get(i) {
                Some(word) => word.to_string(),
                None => format!("word{i}"),
            })
            .collect()
    }

    /// Fresh catalog of `count` words
    pub fn catalog(count: usize) -> Vec<Item> {
        catalog::initialize(Self::words(count))
    }

    /// Never-scheduled item
    pub fn new_item(id: &str) -> Item {
        Item::with_id(id, id)
    }

    /// Graduated but never graded item, due at `due`
    pub fn due_item(id: &str, due: DateTime<Utc>) -> Item {
        let mut item = Self::new_item(id);
        item.schedule = item.schedule.graduate(due);
        item
    }

    /// Item in Review with the given schedule numbers
    pub fn review_item(id: &str, due: DateTime<Utc>, stability: f64, difficulty: f64) -> Item {
        let mut item = Self::new_item(id);
        item.schedule = Schedule {
            due: Some(due),
            stability,
            difficulty,
            state: LearningState::Review,
            repetition_count: 3,
            lapses: 0,
            last_reviewed_at: Some(due - Duration::days(stability.round() as i64)),
        };
        item
    }

    /// Item produced by applying `grades` one day apart, starting at `start`
    pub fn graded_item(id: &str, grades: &[Grade], start: DateTime<Utc>) -> Item {
        let scheduler = Scheduler::default();
        let mut item = Self::new_item(id);
        for (day, grade) in grades.iter().enumerate() {
            item = scheduler
                .review_item(&item, *grade, start + Duration::days(day as i64))
                .expect("fixture schedule should be valid");
        }
        item
    }

    /// Item whose stored schedule fails validation
    pub fn corrupt_item(id: &str, due: DateTime<Utc>) -> Item {
        let mut item = Self::review_item(id, due, 4.0, 5.0);
        item.schedule.stability = f64::NAN;
        item
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    /// One new item, one due ten seconds ago
    pub fn due_and_new_scenario() -> TestScenario {
        let now = Self::now();
        TestScenario {
            items: vec![
                Self::new_item("a"),
                Self::due_item("b", now - Duration::seconds(10)),
            ],
            now,
            description: "new item first in catalog, due item second".to_string(),
        }
    }

    /// Several overdue items, two sharing a due timestamp, plus new items
    pub fn overdue_scenario() -> TestScenario {
        let now = Self::now();
        let tie = now - Duration::hours(6);
        TestScenario {
            items: vec![
                Self::new_item("n1"),
                Self::review_item("r1", now - Duration::hours(1), 3.0, 4.0),
                Self::review_item("r2", tie, 5.0, 6.0),
                Self::review_item("r3", tie, 2.0, 3.0),
                Self::review_item("future", now + Duration::days(2), 8.0, 4.0),
                Self::new_item("n2"),
            ],
            now,
            description: "overdue items with a tie, a future item, two new items".to_string(),
        }
    }

    /// Nothing due and nothing new
    pub fn exhausted_scenario() -> TestScenario {
        let now = Self::now();
        TestScenario {
            items: vec![
                Self::review_item("x", now + Duration::minutes(1), 1.0, 5.0),
                Self::review_item("y", now + Duration::days(30), 30.0, 3.0),
            ],
            now,
            description: "every item scheduled in the future".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid() {
        let now = TestDataFactory::now();
        for item in TestDataFactory::overdue_scenario().items {
            assert!(item.schedule.validate().is_ok(), "{}", item.id);
        }
        assert!(TestDataFactory::due_item("b", now).schedule.validate().is_ok());
        assert!(TestDataFactory::corrupt_item("c", now).schedule.validate().is_err());
    }

    #[test]
    fn test_catalog_ids() {
        let items = TestDataFactory::catalog(14);
        assert_eq!(items.len(), 14);
        assert_eq!(items[0].content, "the");
        assert_eq!(items[13].content, "word13");
        assert_eq!(items[13].id, "wordId0014");
    }
}
