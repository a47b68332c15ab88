//! Journey: a learner's first session
//!
//! Walks the due-then-new scenario through both the pure functions and a
//! full review session, checking each step a host would observe.

use chrono::Duration;
use lexicard_core::{
    effective_grade, select, select_next, Grade, LearningState, RawSignal, Scheduler,
    SessionConfig,
};
use lexicard_e2e_tests::{RecordingObserver, TestDataFactory, TestStoreManager};

#[test]
fn test_due_item_then_new_item_with_pure_functions() {
    let scenario = TestDataFactory::due_and_new_scenario();
    let now = scenario.now;
    let mut items = scenario.items;

    let first = select_next(&items, now).expect("an item should be due");
    assert_eq!(first.id, "b");

    let grade = effective_grade(
        RawSignal::Correct,
        Duration::seconds(1),
        SessionConfig::default().fast_answer_threshold(),
    );
    assert_eq!(grade, Grade::Easy);

    let graded_at = now + Duration::seconds(1);
    let b = Scheduler::default()
        .review_item(&items[1], grade, graded_at)
        .unwrap();
    assert!(b.schedule.due.unwrap() > now);
    assert_eq!(b.schedule.repetition_count, 1);
    assert_eq!(b.consecutive_lapse_count, 0);
    assert_eq!(b.schedule.state, LearningState::Review);
    items[1] = b;

    let selection = select(&items, graded_at).expect("the new item remains");
    assert_eq!(selection.item().id, "a");
    assert!(selection.needs_graduation());

    // The caller owns the graduation write
    items[0].schedule = items[0].schedule.graduate(graded_at);
    assert_eq!(items[0].schedule.due, Some(graded_at));
    assert_eq!(select_next(&items, graded_at).unwrap().id, "a");
}

#[test]
fn test_due_item_then_new_item_through_session() {
    let scenario = TestDataFactory::due_and_new_scenario();
    let now = scenario.now;
    let manager = TestStoreManager::with_items(scenario.items);
    let mut session =
        manager.open_session_with(RecordingObserver::default(), SessionConfig::default(), now);

    assert_eq!(session.next(now).unwrap().unwrap().id, "b");
    let outcome = session
        .grade(RawSignal::Correct, now + Duration::seconds(1))
        .unwrap();
    assert_eq!(outcome.grade, Grade::Easy);
    assert!(outcome.item.schedule.due.unwrap() > now);
    assert_eq!(outcome.item.schedule.repetition_count, 1);
    assert_eq!(outcome.item.consecutive_lapse_count, 0);

    let later = now + Duration::seconds(2);
    let a = session.next(later).unwrap().unwrap();
    assert_eq!(a.id, "a");
    assert_eq!(a.schedule.due, Some(later));

    // Both writes reached the store
    assert_eq!(manager.item("a").schedule.due, Some(later));
    assert_eq!(manager.item("b"), outcome.item);

    let summary = session.finish(later);
    assert_eq!(summary.reviewed, 1);
    assert_eq!(summary.easy, 1);
    assert_eq!(summary.introduced, 1);
}

#[test]
fn test_first_session_over_fresh_catalog() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(4));
    let mut observer = RecordingObserver::default();
    let mut session = manager.open_session_with(&mut observer, SessionConfig::default(), now);

    let mut clock = now;
    let mut seen = Vec::new();
    while let Some(item) = session.next(clock).unwrap() {
        seen.push(item.content.clone());
        clock += Duration::seconds(8);
        session.grade(RawSignal::Correct, clock).unwrap();
    }

    assert_eq!(seen, ["the", "and", "a", "to"]);
    let summary = session.finish(clock);
    assert_eq!(summary.good, 4);
    assert_eq!(summary.introduced, 4);

    assert_eq!(observer.started.len(), 1);
    assert_eq!(observer.reviews.len(), 4);
    assert!(observer
        .reviews
        .iter()
        .all(|event| event.previous_state == LearningState::New
            && event.state == LearningState::Review
            && event.response_time == Duration::seconds(8)));
    assert_eq!(observer.reviews[3].reviews_in_session, 4);
    assert_eq!(observer.summary.as_ref().map(|s| s.reviewed), Some(4));
}

#[test]
fn test_again_returns_item_after_short_delay() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(2));
    let mut session = manager.open_session(now);

    assert_eq!(session.next(now).unwrap().unwrap().content, "the");
    let outcome = session
        .grade(RawSignal::Incorrect, now + Duration::seconds(5))
        .unwrap();
    assert_eq!(outcome.item.schedule.state, LearningState::Learning);
    assert_eq!(outcome.item.consecutive_lapse_count, 1);

    // The failed word is not due yet, so the next new word comes up
    let t = now + Duration::seconds(10);
    assert_eq!(session.next(t).unwrap().unwrap().content, "and");
    session.grade(RawSignal::Correct, t + Duration::seconds(5)).unwrap();

    // A minute after the failure, the word is back
    let t = now + Duration::seconds(70);
    assert_eq!(session.next(t).unwrap().unwrap().content, "the");
}

#[test]
fn test_problem_item_reported_once_threshold_reached() {
    let now = TestDataFactory::now();
    let manager = TestStoreManager::with_items(TestDataFactory::catalog(1));
    let mut observer = RecordingObserver::default();
    let mut session = manager.open_session_with(&mut observer, SessionConfig::default(), now);

    let mut clock = now;
    for _ in 0..3 {
        session.next(clock).unwrap().unwrap();
        session
            .grade(RawSignal::Incorrect, clock + Duration::seconds(4))
            .unwrap();
        clock += Duration::minutes(5);
    }
    session.finish(clock);

    let lapses: Vec<u32> = observer.problems.iter().map(|(_, _, n)| *n).collect();
    assert_eq!(lapses, [2, 3]);
    assert!(observer.problems.iter().all(|(learner, id, _)| {
        learner == TestStoreManager::DEFAULT_LEARNER && id == "wordId0001"
    }));
}
