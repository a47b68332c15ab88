//! Review observers
//!
//! Telemetry hooks a session calls after each step. The session never
//! depends on what an observer does with the events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::fsrs::{Grade, LearningState, RawSignal};
use crate::item::Item;

/// One applied grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub learner: String,
    pub item_id: String,
    pub raw: RawSignal,
    /// Grade after timing inference
    pub grade: Grade,
    /// Time from presentation to grading
    #[serde(with = "duration_millis")]
    pub response_time: Duration,
    pub previous_state: LearningState,
    pub state: LearningState,
    pub due: Option<DateTime<Utc>>,
    /// Reviews completed in this session, this one included
    pub reviews_in_session: u32,
}

/// Totals for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub learner: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub reviewed: u32,
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
    /// Items moved from new into the due pool
    pub introduced: u32,
}

impl SessionSummary {
    pub(crate) fn new(learner: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            learner: learner.to_string(),
            started_at,
            ended_at: None,
            reviewed: 0,
            again: 0,
            hard: 0,
            good: 0,
            easy: 0,
            introduced: 0,
        }
    }

    pub(crate) fn record(&mut self, grade: Grade) {
        self.reviewed += 1;
        match grade {
            Grade::Again => self.again += 1,
            Grade::Hard => self.hard += 1,
            Grade::Good => self.good += 1,
            Grade::Easy => self.easy += 1,
        }
    }

    /// Session length, once finished
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

/// Receives session telemetry; every hook defaults to doing nothing
pub trait ReviewObserver {
    fn on_session_start(&mut self, _learner: &str, _at: DateTime<Utc>) {}

    fn on_review(&mut self, _event: &ReviewEvent) {}

    /// Called when an item's consecutive lapses reach the problem threshold
    fn on_problem_item(&mut self, _learner: &str, _item: &Item) {}

    fn on_session_end(&mut self, _summary: &SessionSummary) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReviewObserver for NoopObserver {}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReviewObserver for TracingObserver {
    fn on_session_start(&mut self, learner: &str, at: DateTime<Utc>) {
        tracing::info!(learner, %at, "Session started");
    }

    fn on_review(&mut self, event: &ReviewEvent) {
        tracing::info!(
            learner = %event.learner,
            item = %event.item_id,
            grade = %event.grade,
            response_ms = event.response_time.num_milliseconds(),
            state = %event.state,
            reviews = event.reviews_in_session,
            "Item reviewed"
        );
    }

    fn on_problem_item(&mut self, learner: &str, item: &Item) {
        tracing::warn!(
            learner,
            item = %item.id,
            content = %item.content,
            consecutive_lapses = item.consecutive_lapse_count,
            "Problem item detected"
        );
    }

    fn on_session_end(&mut self, summary: &SessionSummary) {
        tracing::info!(
            learner = %summary.learner,
            reviewed = summary.reviewed,
            introduced = summary.introduced,
            seconds = summary.duration().map(|d| d.num_seconds()),
            "Session ended"
        );
    }
}

impl<T: ReviewObserver + ?Sized> ReviewObserver for &mut T {
    fn on_session_start(&mut self, learner: &str, at: DateTime<Utc>) {
        (**self).on_session_start(learner, at)
    }

    fn on_review(&mut self, event: &ReviewEvent) {
        (**self).on_review(event)
    }

    fn on_problem_item(&mut self, learner: &str, item: &Item) {
        (**self).on_problem_item(learner, item)
    }

    fn on_session_end(&mut self, summary: &SessionSummary) {
        (**self).on_session_end(summary)
    }
}

mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}
