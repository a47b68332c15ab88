//! # Lexicard Core
//!
//! Scheduling engine for reading practice. Each learner works through a fixed
//! catalog of words; every reading is graded and the word comes back when the
//! memory model says it is about to be forgotten.
//!
//! - **FSRS-6**: 21-parameter memory model with strictly ordered
//!   Hard < Good < Easy intervals
//! - **Timing inference**: a fast correct answer is promoted to `Easy`
//! - **Due-first selection**: overdue words before new ones, catalog order
//!   breaking ties, so two runs over the same data pick the same word
//! - **Injected collaborators**: catalog loading, persistence and telemetry
//!   are traits, not globals
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use lexicard_core::prelude::*;
//!
//! let store = InMemoryStore::new();
//! store.insert_catalog("ada", catalog::initialize(["the", "and", "cat"]))?;
//!
//! let now = Utc::now();
//! let mut session = ReviewSession::open(
//!     "ada",
//!     &store,
//!     &store,
//!     NoopObserver,
//!     Scheduler::default(),
//!     SessionConfig::default(),
//!     now,
//! )?;
//!
//! let word = session.next(now)?.map(|item| item.content.clone());
//! assert_eq!(word.as_deref(), Some("the"));
//!
//! let outcome = session.grade(RawSignal::Correct, now + chrono::Duration::seconds(5))?;
//! assert_eq!(outcome.grade, Grade::Good);
//! # Ok::<(), lexicard_core::SessionError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod fsrs;
pub mod item;
pub mod progress;
pub mod selector;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{ConfigError, LexicardConfig, ProgressConfig, SessionConfig};

pub use error::{Result, SchedulerError, SessionError};

// FSRS-6 algorithm
pub use fsrs::{
    effective_grade,
    retrievability,
    Grade,
    LearningState,
    PreviewResults,
    RawSignal,
    Scheduler,
    SchedulerParameters,
    DEFAULT_FAST_ANSWER_SECS,
};

pub use item::{Item, ItemUpdate, Schedule};

pub use progress::{rank, LearnerProgress, DEFAULT_MASTERY_THRESHOLD};

pub use selector::{partition, select, select_next, select_upcoming, Partition, Selection};

pub use session::{
    GradeOutcome, NoopObserver, ReviewEvent, ReviewObserver, ReviewSession, SessionSummary,
    TracingObserver,
};

pub use storage::{CatalogProvider, InMemoryStore, ScheduleSink, StoreError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (6 = 21 parameters)
pub const FSRS_VERSION: u8 = 6;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::catalog;
    pub use crate::{
        CatalogProvider, Grade, InMemoryStore, Item, LearnerProgress, LearningState,
        LexicardConfig, NoopObserver, RawSignal, ReviewObserver, ReviewSession, Schedule,
        ScheduleSink, Scheduler, SessionConfig, SessionError, StoreError,
    };
}
