use std::error::Error;

use watchdom::{Document, ElementWatcher, FrameClock, WatchCallbacks, WatchOutcome};
use watchdom_test_utils::builders::ElementBuilder;
use watchdom_test_utils::callbacks::CallbackRecorder;
use watchdom_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn direct_watch_fires_on_watch_immediately() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let step = ElementBuilder::new("div").id("step-1").attach_to(&document);
    let recorder = CallbackRecorder::new();

    let outcome = watcher.watch(&step, recorder.callbacks()).await?;

    assert_eq!(outcome, WatchOutcome::Attached(1));
    assert_eq!(recorder.watch_count(), 1);
    assert_eq!(recorder.watched_elements(), vec![step]);
    assert_eq!(watcher.tracked_count(), 1);
    Ok(())
}

#[tokio::test]
async fn direct_watches_are_never_deduplicated() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let step = ElementBuilder::new("div").id("step-1").attach_to(&document);
    let recorder = CallbackRecorder::new();

    watcher.watch(&step, recorder.callbacks()).await?;
    watcher.watch(&step, recorder.callbacks()).await?;

    // The same element watched twice is two independent entries, each with
    // its own lifecycle.
    assert_eq!(recorder.watch_count(), 2);
    assert_eq!(watcher.tracked_count(), 2);

    watcher.unwatch_all();
    assert_eq!(recorder.unwatch_count(), 2);
    Ok(())
}

#[tokio::test]
async fn direct_snapshot_is_taken_at_watch_time() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let step = ElementBuilder::new("div")
        .id("step-1")
        .style("background-color", "red")
        .attach_to(&document);
    let recorder = CallbackRecorder::new();

    watcher.watch(&step, recorder.callbacks()).await?;

    // Decorate the element after the watch attached; the snapshot handed
    // back on unwatch must still hold the original value.
    step.set_style("background-color", "yellow");
    watcher.unwatch_all();

    let unwatched = recorder.unwatched();
    assert_eq!(unwatched.len(), 1);
    let (element, snapshot) = &unwatched[0];
    assert_eq!(element, &step);
    assert_eq!(snapshot.get("background-color"), Some("red"));
    assert_eq!(snapshot.get("backgroundColor"), Some("red"));
    Ok(())
}

#[tokio::test]
async fn watch_without_callbacks_still_tracks() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let step = ElementBuilder::new("div").attach_to(&document);
    let outcome = watcher.watch(&step, WatchCallbacks::new()).await?;

    assert_eq!(outcome, WatchOutcome::Attached(1));
    assert_eq!(watcher.tracked_count(), 1);

    watcher.unwatch_all();
    assert_eq!(watcher.tracked_count(), 0);
    Ok(())
}
