use std::error::Error;
use std::time::Duration;

use watchdom::{Document, ElementWatcher, FrameClock, SelectorErrorKind, WatchOutcome};
use watchdom_test_utils::builders::ElementBuilder;
use watchdom_test_utils::callbacks::CallbackRecorder;
use watchdom_test_utils::{init_tracing, step_frames, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn existing_match_resolves_without_any_frame() -> TestResult {
    init_tracing();

    let document = Document::new();
    let clock = FrameClock::new();
    let watcher = ElementWatcher::new(document.clone(), clock.clone());

    let step = ElementBuilder::new("div")
        .class("first-step")
        .text("Step one")
        .attach_to(&document);
    let recorder = CallbackRecorder::new();

    // The clock never advances here; the initial query must be enough.
    let outcome = with_timeout(watcher.watch(".first-step", recorder.callbacks())).await?;

    assert_eq!(outcome, WatchOutcome::Attached(1));
    assert_eq!(clock.frame(), 0);
    assert_eq!(recorder.watched_elements(), vec![step]);
    Ok(())
}

#[tokio::test]
async fn late_element_is_found_on_a_following_frame() -> TestResult {
    init_tracing();

    let document = Document::new();
    let clock = FrameClock::new();
    let watcher = ElementWatcher::new(document.clone(), clock.clone());
    let recorder = CallbackRecorder::new();

    let watch = watcher.watch(".late-step", recorder.callbacks());
    let host = async {
        // A couple of frames with no match, then the element shows up.
        step_frames(&clock, 2).await;

        let step = ElementBuilder::new("div")
            .class("late-step")
            .text("here now")
            .attach_to(&document);
        clock.advance();
        step
    };

    let (outcome, step) = with_timeout(async { tokio::join!(watch, host) }).await;

    assert_eq!(outcome?, WatchOutcome::Attached(1));
    assert_eq!(recorder.watched_elements(), vec![step]);
    Ok(())
}

#[tokio::test]
async fn selector_attaches_to_every_current_match() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let first = ElementBuilder::new("div")
        .class("step")
        .id("a")
        .attach_to(&document);
    let second = ElementBuilder::new("div")
        .class("step")
        .id("b")
        .attach_to(&document);
    let recorder = CallbackRecorder::new();

    let outcome = with_timeout(watcher.watch(".step", recorder.callbacks())).await?;

    assert_eq!(outcome, WatchOutcome::Attached(2));
    // Document order, not match order.
    assert_eq!(recorder.watched_elements(), vec![first, second]);
    assert_eq!(watcher.tracked_count(), 2);
    Ok(())
}

#[tokio::test]
async fn rewatching_same_key_fires_watch_again_without_unwatch() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    ElementBuilder::new("div")
        .class("step")
        .id("a")
        .attach_to(&document);
    let recorder = CallbackRecorder::new();

    with_timeout(watcher.watch(".step", recorder.callbacks())).await?;
    with_timeout(watcher.watch(".step", recorder.callbacks())).await?;

    // Same element, same key: the entry is refreshed, not duplicated.
    assert_eq!(recorder.watch_count(), 2);
    assert_eq!(recorder.unwatch_count(), 0);
    assert_eq!(watcher.tracked_count(), 1);
    Ok(())
}

#[tokio::test]
async fn rewatching_replaces_the_stored_callbacks() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    ElementBuilder::new("div")
        .class("step")
        .id("a")
        .attach_to(&document);
    let old_recorder = CallbackRecorder::new();
    let new_recorder = CallbackRecorder::new();

    with_timeout(watcher.watch(".step", old_recorder.callbacks())).await?;
    with_timeout(watcher.watch(".step", new_recorder.callbacks())).await?;

    watcher.unwatch_all();

    // Only the latest callbacks observe the release.
    assert_eq!(old_recorder.unwatch_count(), 0);
    assert_eq!(new_recorder.unwatch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn invalid_selector_fails_before_waiting() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());
    let recorder = CallbackRecorder::new();

    let err = watcher
        .watch("div >", recorder.callbacks())
        .await
        .expect_err("dangling combinator must not compile");
    assert_eq!(err.kind(), &SelectorErrorKind::DanglingCombinator);
    assert_eq!(watcher.tracked_count(), 0);
    Ok(())
}

#[tokio::test]
async fn detached_watch_resolves_in_the_background() -> TestResult {
    init_tracing();

    let document = Document::new();
    let clock = FrameClock::new();
    let watcher = ElementWatcher::new(document.clone(), clock.clone());
    let recorder = CallbackRecorder::new();

    watcher.watch_detached(".bg-step", recorder.callbacks())?;

    let _driver = clock.spawn_interval_driver(Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(20)).await;

    ElementBuilder::new("div").class("bg-step").attach_to(&document);

    for _ in 0..100 {
        if recorder.watch_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(recorder.watch_count(), 1);
    assert_eq!(watcher.tracked_count(), 1);
    Ok(())
}
