//! Persistence failures, retries and restarts
//!
//! A grade counts only once it is stored: a failed write must leave both
//! the session and the store as they were.

use chrono::Duration;
use lexicard_core::{
    CatalogProvider, Grade, InMemoryStore, NoopObserver, RawSignal, ReviewSession, Scheduler,
    SessionConfig, SessionError, StoreError,
};
use lexicard_e2e_tests::{FailingSink, TestDataFactory, TestStoreManager};

fn open_failing<'a>(
    manager: &'a TestStoreManager,
    sink: &'a FailingSink<&'a InMemoryStore>,
) -> ReviewSession<&'a FailingSink<&'a InMemoryStore>> {
    ReviewSession::open(
        manager.learner(),
        &manager.store,
        sink,
        NoopObserver,
        Scheduler::default(),
        SessionConfig::default(),
        TestDataFactory::now(),
    )
    .unwrap()
}

#[test]
fn test_failed_grade_can_be_retried() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(2));
    let sink = FailingSink::new(&manager.store);
    let mut session = open_failing(&manager, &sink);

    let presented = session.next(now).unwrap().unwrap().clone();
    let stored_before = manager.snapshot();

    sink.fail_next(2);
    for attempt in 1..=2 {
        let result = session.grade(RawSignal::Correct, now + Duration::seconds(attempt));
        assert!(matches!(result, Err(SessionError::Store(StoreError::Backend(_)))));
        assert_eq!(session.presented(), Some(&presented));
        assert_eq!(session.items(), stored_before.as_slice());
        assert_eq!(manager.snapshot(), stored_before);
    }

    // Retrying still measures from the original presentation
    let outcome = session
        .grade(RawSignal::Correct, now + Duration::seconds(9))
        .unwrap();
    assert_eq!(outcome.response_time, Duration::seconds(9));
    assert_eq!(outcome.item.schedule.repetition_count, 1);
    assert_eq!(manager.item(&presented.id), outcome.item);
    assert_eq!(session.summary().reviewed, 1);
    // graduation + two failures + success
    assert_eq!(sink.attempts(), 4);
}

#[test]
fn test_failed_graduation_leaves_item_new() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(2));
    let sink = FailingSink::new(&manager.store);
    let mut session = open_failing(&manager, &sink);

    sink.fail_next(1);
    assert!(session.next(now).is_err());
    assert!(session.presented().is_none());
    assert!(session.items().iter().all(|item| item.is_new()));
    assert_eq!(session.summary().introduced, 0);

    let item = session.next(now).unwrap().unwrap();
    assert_eq!(item.id, "wordId0001");
    assert_eq!(manager.item("wordId0001").schedule.due, Some(now));
}

#[test]
fn test_restart_resumes_from_stored_state() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(3));

    let mut session = manager.open_session(now);
    session.next(now).unwrap();
    let first = session
        .grade(RawSignal::Explicit(Grade::Hard), now + Duration::seconds(4))
        .unwrap();
    // Present the second word, then drop the session without grading it
    let abandoned = session.next(now + Duration::seconds(5)).unwrap().unwrap().id.clone();
    drop(session);

    let restart = now + Duration::minutes(1);
    let mut session = manager.open_session(restart);
    assert_eq!(session.items()[0], first.item);

    // The graduated but ungraded word is now due and comes first
    let resumed = session.next(restart).unwrap().unwrap();
    assert_eq!(resumed.id, abandoned);
    assert_eq!(resumed.schedule.repetition_count, 0);
    assert!(!resumed.is_new());
}

#[test]
fn test_corrupt_item_repaired_and_persisted() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(vec![
        TestDataFactory::corrupt_item("broken", now - Duration::hours(1)),
        TestDataFactory::new_item("fine"),
    ]);
    let mut session = manager.open_session(now);
    assert_eq!(session.corrupt_items().len(), 1);

    assert_eq!(session.next(now).unwrap().unwrap().id, "broken");
    let err = session.grade(RawSignal::Correct, now + Duration::seconds(5));
    assert!(matches!(err, Err(SessionError::Scheduler(_))));

    session.repair("broken").unwrap();
    assert!(manager.item("broken").is_new());
    assert!(session.corrupt_items().is_empty());

    // Both items are new again; catalog order decides
    assert_eq!(session.next(now).unwrap().unwrap().id, "broken");
    assert!(session
        .grade(RawSignal::Correct, now + Duration::seconds(5))
        .is_ok());
}

#[test]
fn test_unknown_learner() {
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(1));
    assert!(matches!(
        manager.store.load("someone-else"),
        Err(StoreError::LearnerNotFound(_))
    ));

    let result = ReviewSession::open(
        "someone-else",
        &manager.store,
        &manager.store,
        NoopObserver,
        Scheduler::default(),
        SessionConfig::default(),
        TestDataFactory::now(),
    );
    assert!(matches!(
        result,
        Err(SessionError::Store(StoreError::LearnerNotFound(_)))
    ));
}
