use std::error::Error;

use watchdom::{
    Document, ElementWatcher, FrameClock, SnapshotScope, StyleSnapshot, WatcherOptions,
};
use watchdom_test_utils::builders::ElementBuilder;
use watchdom_test_utils::callbacks::CallbackRecorder;
use watchdom_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn full_snapshot_duplicates_camel_and_dashed_keys() {
    init_tracing();

    let document = Document::new();
    let element = ElementBuilder::new("div")
        .style("background-color", "teal")
        .attach_to(&document);

    let snapshot = StyleSnapshot::capture(&element, SnapshotScope::Full);

    assert_eq!(snapshot.get("background-color"), Some("teal"));
    assert_eq!(snapshot.get("backgroundColor"), Some("teal"));
    // Untouched properties come from the computed defaults.
    assert_eq!(snapshot.get("pointer-events"), Some("auto"));
    assert_eq!(snapshot.get("pointerEvents"), Some("auto"));
    assert_eq!(snapshot.get("visibility"), Some("visible"));
}

#[test]
fn interaction_snapshot_holds_only_its_pair() {
    init_tracing();

    let document = Document::new();
    let element = ElementBuilder::new("div")
        .style("visibility", "hidden")
        .style("background-color", "teal")
        .attach_to(&document);

    let snapshot = StyleSnapshot::capture(&element, SnapshotScope::Interaction);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("visibility"), Some("hidden"));
    assert_eq!(snapshot.get("pointer-events"), Some("auto"));
    assert_eq!(snapshot.get("pointerEvents"), Some("auto"));
    assert_eq!(snapshot.get("background-color"), None);
}

#[test]
fn full_restore_writes_captured_values_back() {
    init_tracing();

    let document = Document::new();
    let element = ElementBuilder::new("div")
        .style("color", "red")
        .attach_to(&document);

    let snapshot = StyleSnapshot::capture(&element, SnapshotScope::Full);

    element.set_style("color", "blue");
    element.set_style("visibility", "hidden");
    snapshot.restore(&element);

    assert_eq!(element.style("color"), "red");
    assert_eq!(element.style("visibility"), "visible");
}

#[test]
fn interaction_restore_leaves_other_styles_alone() {
    init_tracing();

    let document = Document::new();
    let element = ElementBuilder::new("div").attach_to(&document);

    let snapshot = StyleSnapshot::capture(&element, SnapshotScope::Interaction);

    element.set_style("visibility", "hidden");
    element.set_style("pointer-events", "none");
    element.set_style("color", "blue");
    snapshot.restore(&element);

    assert_eq!(element.style("visibility"), "visible");
    assert_eq!(element.style("pointer-events"), "auto");
    // Outside the interaction pair, decorations survive.
    assert_eq!(element.style("color"), "blue");
}

#[tokio::test]
async fn watcher_captures_at_the_configured_scope() -> TestResult {
    init_tracing();

    let document = Document::new();
    let options = WatcherOptions {
        snapshot_scope: SnapshotScope::Interaction,
    };
    let watcher = ElementWatcher::with_options(document.clone(), FrameClock::new(), options);

    ElementBuilder::new("div").class("step").attach_to(&document);
    let recorder = CallbackRecorder::new();

    with_timeout(watcher.watch(".step", recorder.callbacks())).await?;
    watcher.unwatch_all();

    let unwatched = recorder.unwatched();
    assert_eq!(unwatched.len(), 1);
    assert!(matches!(
        unwatched[0].1,
        StyleSnapshot::Interaction { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn snapshot_survives_decoration_between_watch_calls() -> TestResult {
    init_tracing();

    let document = Document::new();
    let watcher = ElementWatcher::new(document.clone(), FrameClock::new());

    let step = ElementBuilder::new("div")
        .class("step")
        .id("intro")
        .style("background-color", "red")
        .attach_to(&document);
    let recorder = CallbackRecorder::new();

    with_timeout(watcher.watch(".step", recorder.callbacks())).await?;

    // A highlighter decorates the element, then the selector is watched
    // again (same key, same element). The snapshot must not be retaken.
    step.set_style("background-color", "gold");
    with_timeout(watcher.watch(".step", recorder.callbacks())).await?;

    watcher.unwatch_all();

    let unwatched = recorder.unwatched();
    assert_eq!(unwatched.len(), 1);
    assert_eq!(unwatched[0].1.get("background-color"), Some("red"));
    Ok(())
}
