//! Test harness


pub use observers::{FailingSink, RecordingObserver};
pub use store_manager::TestStoreManager;
