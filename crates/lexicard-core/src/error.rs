//! Error types
//!
//! Core operations fail fast: corrupt input is rejected where it is read,
//! never coerced into something schedulable.

use crate::storage::StoreError;

/// Errors from the scheduling core
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// Grade outside Again/Hard/Good/Easy
    #[error("Invalid grade '{0}': expected 1-4 or again/hard/good/easy")]
    InvalidGrade(String),
    /// Schedule with negative or non-finite parameters, or inconsistent state
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    /// Next due date falls outside the representable calendar
    #[error("Due date out of range: {0}")]
    DueOutOfRange(String),
}

/// Errors from a review session
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Scheduling failed (bad grade or corrupt schedule)
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// Catalog load or persistence failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// `grade` called with nothing on screen
    #[error("No item is being presented")]
    NothingPresented,
    /// Presented item vanished from the cached catalog
    #[error("Item not in catalog: {0}")]
    UnknownItem(String),
}

/// Session result type
pub type Result<T> = std::result::Result<T, SessionError>;
