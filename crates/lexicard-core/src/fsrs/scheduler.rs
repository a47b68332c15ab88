//! FSRS-6 Scheduler
//!
//! Turns a graded response into an updated [`Schedule`]. The scheduler holds
//! only immutable parameters, so every call is a pure function of
//! `(schedule, grade, now)`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    initial_difficulty_with_weights, initial_stability_with_weights,
    next_difficulty_with_weights, next_forget_stability_with_weights,
    next_interval_with_decay, next_recall_stability_with_weights,
    retrievability_with_decay, same_day_stability_with_weights, DEFAULT_RETENTION,
    FSRS6_WEIGHTS, MAX_DIFFICULTY, MAX_STABILITY, MIN_DIFFICULTY, MIN_STABILITY, WEIGHT_COUNT,
};
use crate::config::ConfigError;
use crate::error::SchedulerError;
use crate::item::{Item, Schedule};

// ============================================================================
// GRADE
// ============================================================================

/// Recall quality reported for one review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Failed recall (lapse)
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled after some hesitation
    Good = 3,
    /// Recalled instantly
    Easy = 4,
}

impl Grade {
    /// All grades in ordinal order
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Ordinal value (1-4)
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Ordinal value as used by the FSRS formulas
    pub(crate) fn value(self) -> f64 {
        self as i32 as f64
    }

    /// Zero-based index into per-grade weight tables
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    /// Parse the ordinal form (1=Again .. 4=Easy)
    pub fn from_i32(value: i32) -> Result<Self, SchedulerError> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(SchedulerError::InvalidGrade(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }

    /// Anything but `Again`
    pub fn is_pass(self) -> bool {
        self != Grade::Again
    }
}

impl TryFrom<i32> for Grade {
    type Error = SchedulerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Grade::from_i32(value)
    }
}

impl std::str::FromStr for Grade {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i32>() {
            return Grade::from_i32(n);
        }
        match trimmed.to_lowercase().as_str() {
            "again" => Ok(Grade::Again),
            "hard" => Ok(Grade::Hard),
            "good" => Ok(Grade::Good),
            "easy" => Ok(Grade::Easy),
            _ => Err(SchedulerError::InvalidGrade(s.to_string())),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// GRADE INFERENCE
// ============================================================================

/// Default window within which a correct answer counts as instant
pub const DEFAULT_FAST_ANSWER_SECS: f64 = 3.0;

/// What the learner actually signalled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawSignal {
    /// Binary "I read it correctly" (treated as Good)
    Correct,
    /// Binary "I got it wrong" (treated as Again)
    Incorrect,
    /// Explicit four-level grade
    Explicit(Grade),
}

impl RawSignal {
    /// Grade before any timing adjustment
    pub fn base_grade(self) -> Grade {
        match self {
            RawSignal::Correct => Grade::Good,
            RawSignal::Incorrect => Grade::Again,
            RawSignal::Explicit(grade) => grade,
        }
    }
}

/// Grade the scheduler should see for a raw signal
///
/// A `Good` given within `fast_threshold` of presentation is promoted to
/// `Easy`. Negative elapsed time (clock skew) counts as zero.
pub fn effective_grade(raw: RawSignal, elapsed: Duration, fast_threshold: Duration) -> Grade {
    let elapsed = elapsed.max(Duration::zero());
    match raw.base_grade() {
        Grade::Good if elapsed <= fast_threshold => Grade::Easy,
        grade => grade,
    }
}

// ============================================================================
// LEARNING STATE
// ============================================================================

/// Lifecycle stage of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningState {
    /// Never reviewed
    #[default]
    New,
    /// Failed on first contact, not yet graduated
    Learning,
    /// Graduated into long-term review
    Review,
    /// Lapsed after graduating
    Relearning,
}

impl LearningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningState::New => "new",
            LearningState::Learning => "learning",
            LearningState::Review => "review",
            LearningState::Relearning => "relearning",
        }
    }
}

impl std::fmt::Display for LearningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Tunable scheduler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerParameters {
    /// FSRS-6 weights w0..w20
    pub weights: Vec<f64>,
    /// Target recall probability at the scheduled review (0, 1)
    pub desired_retention: f64,
    /// Longest interval ever scheduled, in days
    pub maximum_interval: u32,
    /// Delay before a failed item in Learning comes back
    pub again_delay_secs: u64,
    /// Delay before a lapsed item in Relearning comes back
    pub relearning_delay_secs: u64,
}

/// Longest Again delay accepted, in seconds
pub const MAX_AGAIN_DELAY_SECS: u64 = 86_400;

impl Default for SchedulerParameters {
    fn default() -> Self {
        Self {
            weights: FSRS6_WEIGHTS.to_vec(),
            desired_retention: DEFAULT_RETENTION,
            maximum_interval: 36500,
            again_delay_secs: 60,
            relearning_delay_secs: 600,
        }
    }
}

impl SchedulerParameters {
    /// Reject parameters the formulas cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weights.len() != WEIGHT_COUNT {
            return Err(ConfigError::Invalid(format!(
                "expected {} weights, got {}",
                WEIGHT_COUNT,
                self.weights.len()
            )));
        }
        if let Some(bad) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(ConfigError::Invalid(format!("weight w{} is not finite", bad)));
        }
        if self.weights[20] <= 0.0 {
            return Err(ConfigError::Invalid("decay weight w20 must be positive".into()));
        }
        if !(self.desired_retention > 0.0 && self.desired_retention < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "desired retention must be in (0, 1), got {}",
                self.desired_retention
            )));
        }
        let longest = MAX_STABILITY as u32;
        if !(1..=longest).contains(&self.maximum_interval) {
            return Err(ConfigError::Invalid(format!(
                "maximum interval must be between 1 and {} days, got {}",
                longest, self.maximum_interval
            )));
        }
        for (name, secs) in [
            ("again delay", self.again_delay_secs),
            ("relearning delay", self.relearning_delay_secs),
        ] {
            if !(1..=MAX_AGAIN_DELAY_SECS).contains(&secs) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {} seconds, got {}",
                    name, MAX_AGAIN_DELAY_SECS, secs
                )));
            }
        }
        Ok(())
    }

    fn decay(&self) -> f64 {
        self.weights[20]
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Outcome of every grade for one schedule, computed without committing any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResults {
    pub again: Schedule,
    pub hard: Schedule,
    pub good: Schedule,
    pub easy: Schedule,
}

impl PreviewResults {
    pub fn get(&self, grade: Grade) -> &Schedule {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }
}

/// Stability/difficulty pair produced by one grade
#[derive(Debug, Clone, Copy)]
struct MemoryUpdate {
    stability: f64,
    difficulty: f64,
}

/// Whole-day intervals for the three passing grades, strictly ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassingIntervals {
    hard: i64,
    good: i64,
    easy: i64,
}

impl PassingIntervals {
    fn for_grade(&self, grade: Grade) -> i64 {
        match grade {
            Grade::Hard => self.hard,
            Grade::Easy => self.easy,
            _ => self.good,
        }
    }
}

/// FSRS-6 scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    params: SchedulerParameters,
}

impl Scheduler {
    /// Create a scheduler, validating the parameters
    pub fn new(params: SchedulerParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &SchedulerParameters {
        &self.params
    }

    /// Apply a grade recorded at `now`, returning the updated schedule
    ///
    /// The input is validated first so that corrupt stored state is
    /// reported rather than propagated into the next schedule.
    pub fn apply_grade(
        &self,
        schedule: &Schedule,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<Schedule, SchedulerError> {
        schedule.validate()?;
        let elapsed = elapsed_days(schedule.last_reviewed_at, now);
        let updated = self.next_schedule(schedule, grade, elapsed, now)?;

        tracing::debug!(
            grade = %grade,
            state_before = %schedule.state,
            state_after = %updated.state,
            stability = updated.stability,
            difficulty = updated.difficulty,
            reps = updated.repetition_count,
            due = ?updated.due,
            "Applied grade"
        );

        Ok(updated)
    }

    /// Apply a grade to an item, tracking consecutive lapses alongside
    pub fn review_item(
        &self,
        item: &Item,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<Item, SchedulerError> {
        let schedule = self.apply_grade(&item.schedule, grade, now)?;
        let consecutive_lapse_count = if grade == Grade::Again {
            item.consecutive_lapse_count + 1
        } else {
            0
        };

        Ok(Item {
            schedule,
            consecutive_lapse_count,
            ..item.clone()
        })
    }

    /// What each grade would do to this schedule at `now`
    pub fn preview(
        &self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<PreviewResults, SchedulerError> {
        schedule.validate()?;
        let elapsed = elapsed_days(schedule.last_reviewed_at, now);
        Ok(PreviewResults {
            again: self.next_schedule(schedule, Grade::Again, elapsed, now)?,
            hard: self.next_schedule(schedule, Grade::Hard, elapsed, now)?,
            good: self.next_schedule(schedule, Grade::Good, elapsed, now)?,
            easy: self.next_schedule(schedule, Grade::Easy, elapsed, now)?,
        })
    }

    fn next_schedule(
        &self,
        schedule: &Schedule,
        grade: Grade,
        elapsed: f64,
        now: DateTime<Utc>,
    ) -> Result<Schedule, SchedulerError> {
        let memory = self.next_memory(schedule, grade, elapsed);
        let mut lapses = schedule.lapses;

        let (state, due) = match grade {
            Grade::Again => {
                let state = match schedule.state {
                    LearningState::New | LearningState::Learning => LearningState::Learning,
                    LearningState::Review | LearningState::Relearning => LearningState::Relearning,
                };
                if schedule.state == LearningState::Review {
                    lapses += 1;
                }
                let delay = match state {
                    LearningState::Relearning => self.params.relearning_delay_secs,
                    _ => self.params.again_delay_secs,
                };
                let delay = i64::try_from(delay).ok().and_then(Duration::try_seconds);
                (state, shift(now, delay)?)
            }
            _ => {
                let days = self.passing_intervals(schedule, elapsed).for_grade(grade);
                (LearningState::Review, shift(now, Duration::try_days(days))?)
            }
        };

        Ok(Schedule {
            due: Some(due),
            stability: memory.stability,
            difficulty: memory.difficulty,
            state,
            repetition_count: schedule.repetition_count.saturating_add(1),
            lapses,
            last_reviewed_at: Some(now),
        })
    }

    fn next_memory(&self, schedule: &Schedule, grade: Grade, elapsed: f64) -> MemoryUpdate {
        let w = &self.params.weights;

        if schedule.state == LearningState::New {
            return MemoryUpdate {
                stability: initial_stability_with_weights(grade, w),
                difficulty: initial_difficulty_with_weights(grade, w),
            };
        }

        let s = schedule.stability.clamp(MIN_STABILITY, MAX_STABILITY);
        let d = schedule.difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        let difficulty = next_difficulty_with_weights(d, grade, w);

        let stability = if elapsed < 1.0 {
            same_day_stability_with_weights(s, grade, w)
        } else {
            let r = retrievability_with_decay(elapsed, s, self.params.decay());
            match grade {
                Grade::Again => next_forget_stability_with_weights(d, s, r, w),
                _ => next_recall_stability_with_weights(d, s, r, grade, w),
            }
        };

        MemoryUpdate {
            stability,
            difficulty,
        }
    }

    fn interval_days(&self, stability: f64) -> i64 {
        let raw = next_interval_with_decay(
            stability,
            self.params.desired_retention,
            self.params.decay(),
        );
        (raw.round() as i64).clamp(1, self.params.maximum_interval as i64)
    }

    // Ordering wins over the maximum-interval cap: easy is always at least
    // one day past good, and good one day past hard.
    fn passing_intervals(&self, schedule: &Schedule, elapsed: f64) -> PassingIntervals {
        let hard = self.interval_days(self.next_memory(schedule, Grade::Hard, elapsed).stability);
        let good = self.interval_days(self.next_memory(schedule, Grade::Good, elapsed).stability);
        let easy = self.interval_days(self.next_memory(schedule, Grade::Easy, elapsed).stability);

        let hard = hard.min(good);
        let good = good.max(hard + 1);
        let easy = easy.max(good + 1);

        PassingIntervals { hard, good, easy }
    }
}

/// `now + delta`, or an error when either is unrepresentable
fn shift(now: DateTime<Utc>, delta: Option<Duration>) -> Result<DateTime<Utc>, SchedulerError> {
    delta
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| SchedulerError::DueOutOfRange(format!("{} plus {:?}", now.to_rfc3339(), delta)))
}

/// Fractional days since the last review; zero for never-reviewed schedules
fn elapsed_days(last_reviewed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match last_reviewed_at {
        Some(last) => ((now - last).num_milliseconds() as f64 / 86_400_000.0).max(0.0),
        None => 0.0,
    }
}

// ============================================================================
// TESTS
// ============================================================================
