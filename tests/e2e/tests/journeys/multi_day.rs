//! Journey: studying across several days
//!
//! New words graduate on day one, come back once their interval has passed,
//! and progress reporting tracks them along the way.

use chrono::{DateTime, Duration, Utc};
use lexicard_core::{
    rank, InMemoryStore, LearnerProgress, LearningState, RawSignal, ReviewSession,
    DEFAULT_MASTERY_THRESHOLD,
};
use lexicard_e2e_tests::{TestDataFactory, TestStoreManager};

/// Study until nothing is due, answering every word slowly and correctly
fn study_all(session: &mut ReviewSession<&InMemoryStore>, start: DateTime<Utc>) -> Vec<String> {
    let mut clock = start;
    let mut seen = Vec::new();
    while let Some(item) = session.next(clock).unwrap() {
        seen.push(item.id.clone());
        clock += Duration::seconds(6);
        session.grade(RawSignal::Correct, clock).unwrap();
    }
    seen
}

#[test]
fn test_words_return_after_their_interval() {
    let day0 = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(5));

    let mut session = manager.open_session(day0);
    let first_pass = study_all(&mut session, day0);
    assert_eq!(first_pass.len(), 5);
    session.finish(day0 + Duration::minutes(5));

    // A Good first answer schedules the word at least a day out
    let day1 = day0 + Duration::days(1) - Duration::hours(1);
    let mut session = manager.open_session(day1);
    assert!(session.next(day1).unwrap().is_none());
    session.finish(day1);

    let later = day0 + Duration::days(10);
    let mut session = manager.open_session(later);
    let second_pass = study_all(&mut session, later);

    // Due order follows the order the words were graded on day one
    assert_eq!(second_pass, first_pass);
    for item in manager.snapshot() {
        assert_eq!(item.schedule.repetition_count, 2);
        assert_eq!(item.schedule.state, LearningState::Review);
        assert!(item.schedule.due.unwrap() > later);
    }
}

#[test]
fn test_intervals_grow_with_successful_reviews() {
    let day0 = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(1));

    let mut clock = day0;
    let mut intervals = Vec::new();
    for _ in 0..4 {
        let mut session = manager.open_session(clock);
        session.next(clock).unwrap().expect("word should be due");
        let graded_at = clock + Duration::seconds(6);
        let outcome = session.grade(RawSignal::Correct, graded_at).unwrap();
        let due = outcome.item.schedule.due.unwrap();
        intervals.push((due - graded_at).num_days());
        clock = due;
    }

    assert!(
        intervals.windows(2).all(|pair| pair[1] > pair[0]),
        "intervals should grow: {intervals:?}"
    );
}

#[test]
fn test_progress_across_learners() {
    let day0 = TestDataFactory::now();
    let busy = TestStoreManager::for_learner("busy", TestDataFactory::catalog(4));
    let idle = TestStoreManager::for_learner("idle", TestDataFactory::catalog(4));

    let mut session = busy.open_session(day0);
    let mut clock = day0;
    for _ in 0..2 {
        session.next(clock).unwrap().unwrap();
        clock += Duration::seconds(10);
        session.grade(RawSignal::Correct, clock).unwrap();
    }
    session.finish(clock);

    let reports = rank(vec![
        LearnerProgress::from_items("idle", &idle.snapshot(), DEFAULT_MASTERY_THRESHOLD, clock),
        LearnerProgress::from_items("busy", &busy.snapshot(), DEFAULT_MASTERY_THRESHOLD, clock),
    ]);

    assert_eq!(reports[0].learner, "busy");
    assert_eq!(reports[0].reviewed, 2);
    assert_eq!(reports[0].percent, 50.0);
    assert_eq!(reports[1].reviewed, 0);

    // Initial Good difficulty sits below the default mastery threshold
    assert_eq!(reports[0].mastered, 2);
    assert_eq!(reports[0].due, 0);
}
