//! Review Session
//!
//! Drives one learner through select → present → grade → persist → select.
//! Collaborators are injected: the catalog is read once at `open`, every
//! schedule change goes through the [`ScheduleSink`] before the cached
//! catalog is touched, and telemetry goes to a [`ReviewObserver`].
//!
//! Mutating methods take `&mut self`, so one session is one writer. Hosts
//! running sessions concurrently must keep at most one open session per
//! learner.

mod observer;

pub use observer::{NoopObserver, ReviewEvent, ReviewObserver, SessionSummary, TracingObserver};

use chrono::{DateTime, Duration, Utc};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::fsrs::{effective_grade, Grade, LearningState, RawSignal, Scheduler};
use crate::item::{Item, Schedule};
use crate::selector::{select, select_upcoming};
use crate::storage::{CatalogProvider, ScheduleSink};

/// Item currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
struct Presented {
    item_id: String,
    shown_at: DateTime<Utc>,
}

/// Result of grading the presented item
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    /// Item as persisted
    pub item: Item,
    /// Grade after timing inference
    pub grade: Grade,
    pub response_time: Duration,
    pub previous_state: LearningState,
    /// True when this grade pushed the item over the problem threshold
    pub problem_item: bool,
}

/// One learner's study session
pub struct ReviewSession<S, O = NoopObserver> {
    learner: String,
    scheduler: Scheduler,
    config: SessionConfig,
    sink: S,
    observer: O,
    items: Vec<Item>,
    presented: Option<Presented>,
    summary: SessionSummary,
}

impl<S: ScheduleSink, O: ReviewObserver> ReviewSession<S, O> {
    /// Load the learner's catalog and start a session
    ///
    /// Items whose stored schedule is corrupt are kept but reported; grading
    /// one fails with `InvalidSchedule` until it is [`repair`](Self::repair)ed.
    pub fn open<C: CatalogProvider>(
        learner: &str,
        catalog: &C,
        sink: S,
        mut observer: O,
        scheduler: Scheduler,
        config: SessionConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let items = catalog.load(learner)?;

        for item in &items {
            if let Err(e) = item.schedule.validate() {
                tracing::warn!(learner, item = %item.id, error = %e, "Corrupt schedule in catalog");
            }
        }

        tracing::info!(learner, items = items.len(), "Catalog loaded");
        observer.on_session_start(learner, now);

        Ok(Self {
            learner: learner.to_string(),
            scheduler,
            config,
            sink,
            observer,
            items,
            presented: None,
            summary: SessionSummary::new(learner, now),
        })
    }

    pub fn learner(&self) -> &str {
        &self.learner
    }

    /// Cached catalog, reflecting every persisted update
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Item currently awaiting a grade
    pub fn presented(&self) -> Option<&Item> {
        let presented = self.presented.as_ref()?;
        self.find(&presented.item_id).map(|index| &self.items[index])
    }

    /// Items whose stored schedule fails validation
    pub fn corrupt_items(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.schedule.validate().is_err())
            .collect()
    }

    /// Select and present the next item
    ///
    /// A new item is graduated (due set to `now`) and persisted before it is
    /// returned. While an item is awaiting a grade, the same item is returned
    /// again with its original presentation time.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<Option<&Item>> {
        if let Some(index) = self
            .presented
            .as_ref()
            .and_then(|presented| self.find(&presented.item_id))
        {
            return Ok(Some(&self.items[index]));
        }

        let (item_id, needs_graduation) = match select(&self.items, now) {
            Some(selection) => (selection.item().id.clone(), selection.needs_graduation()),
            None => {
                tracing::debug!(learner = %self.learner, "Nothing due");
                return Ok(None);
            }
        };
        let index = self
            .find(&item_id)
            .ok_or_else(|| SessionError::UnknownItem(item_id.clone()))?;

        if needs_graduation {
            let mut graduated = self.items[index].clone();
            graduated.schedule = graduated.schedule.graduate(now);
            self.sink.persist(&self.learner, &graduated.to_update())?;
            self.items[index] = graduated;
            self.summary.introduced += 1;
            tracing::info!(learner = %self.learner, item = %item_id, "Introduced new item");
        }

        self.presented = Some(Presented { item_id, shown_at: now });
        Ok(Some(&self.items[index]))
    }

    /// Grade the presented item with the learner's raw signal
    ///
    /// The new schedule is persisted before the cache changes. If persisting
    /// fails, nothing changes and the same item stays presented, so the
    /// call can be retried.
    pub fn grade(&mut self, raw: RawSignal, now: DateTime<Utc>) -> Result<GradeOutcome> {
        let presented = self.presented.clone().ok_or(SessionError::NothingPresented)?;
        let index = self
            .find(&presented.item_id)
            .ok_or_else(|| SessionError::UnknownItem(presented.item_id.clone()))?;

        let response_time = now - presented.shown_at;
        let grade = effective_grade(raw, response_time, self.config.fast_answer_threshold());

        let before = &self.items[index];
        let previous_state = before.schedule.state;
        let reviewed = self.scheduler.review_item(before, grade, now)?;

        self.sink.persist(&self.learner, &reviewed.to_update())?;

        self.items[index] = reviewed.clone();
        self.presented = None;
        self.summary.record(grade);

        let event = ReviewEvent {
            learner: self.learner.clone(),
            item_id: reviewed.id.clone(),
            raw,
            grade,
            response_time,
            previous_state,
            state: reviewed.schedule.state,
            due: reviewed.schedule.due,
            reviews_in_session: self.summary.reviewed,
        };
        self.observer.on_review(&event);

        let problem_item = reviewed.consecutive_lapse_count >= self.config.problem_item_threshold;
        if problem_item {
            self.observer.on_problem_item(&self.learner, &reviewed);
        }

        Ok(GradeOutcome {
            item: reviewed,
            grade,
            response_time,
            previous_state,
            problem_item,
        })
    }

    /// Items to prefetch, excluding the one on screen
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<&Item> {
        let exclude: Vec<&str> = self
            .presented
            .as_ref()
            .map(|presented| presented.item_id.as_str())
            .into_iter()
            .collect();
        select_upcoming(
            &self.items,
            &exclude,
            now,
            self.config.prefetch_due,
            self.config.prefetch_new,
        )
    }

    /// Reset a corrupt item to a fresh schedule and persist it
    pub fn repair(&mut self, item_id: &str) -> Result<&Item> {
        let index = self
            .find(item_id)
            .ok_or_else(|| SessionError::UnknownItem(item_id.to_string()))?;

        let mut repaired = self.items[index].clone();
        repaired.schedule = Schedule::new();
        repaired.consecutive_lapse_count = 0;
        self.sink.persist(&self.learner, &repaired.to_update())?;

        tracing::warn!(learner = %self.learner, item = item_id, "Schedule reset");
        if self
            .presented
            .as_ref()
            .is_some_and(|presented| presented.item_id == item_id)
        {
            self.presented = None;
        }
        self.items[index] = repaired;
        Ok(&self.items[index])
    }

    /// End the session and report its totals
    pub fn finish(mut self, now: DateTime<Utc>) -> SessionSummary {
        self.summary.ended_at = Some(now);
        self.observer.on_session_end(&self.summary);
        self.summary
    }

    fn find(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
