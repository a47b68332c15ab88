//! FSRS-6 (Free Spaced Repetition Scheduler) Module
//!
//! Decides when a word comes back after each graded reading.
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + FACTOR * t / S)^(-w20) where FACTOR = 0.9^(-1/w20) - 1
//! - Interval: t = S/FACTOR * (R^(-1/w20) - 1)
//!
//! ## Scheduling policy
//! - `Again` sends the item back after a short delay (Learning or Relearning)
//! - `Hard`/`Good`/`Easy` graduate it to Review with strictly increasing intervals
//! - A `Good` answered within three seconds counts as `Easy` (see [`effective_grade`])

mod algorithm;
mod scheduler;

pub use algorithm::{
    initial_difficulty,
    initial_difficulty_with_weights,
    initial_stability,
    initial_stability_with_weights,
    next_difficulty,
    next_difficulty_with_weights,
    next_forget_stability,
    next_forget_stability_with_weights,
    next_interval,
    next_interval_with_decay,
    next_recall_stability,
    next_recall_stability_with_weights,
    // Core functions
    retrievability,
    retrievability_with_decay,
    same_day_stability,
    same_day_stability_with_weights,
    DEFAULT_DECAY,
    DEFAULT_RETENTION,
    // Constants
    FSRS6_WEIGHTS,
    MAX_DIFFICULTY,
    MAX_STABILITY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
    WEIGHT_COUNT,
};

pub use scheduler::{
    effective_grade, Grade, LearningState, PreviewResults, RawSignal, Scheduler,
    SchedulerParameters, DEFAULT_FAST_ANSWER_SECS,
};
