//! Lexicard end-to-end test support
//!
//! - [`harness`]: isolated stores, recording observers and failing sinks
//! - [`mocks`]: catalog and schedule fixtures

pub mod harness;
pub mod mocks;

pub use harness::{FailingSink, RecordingObserver, TestStoreManager};
pub use mocks::TestDataFactory;
