// demos/tour.rs
//
// A three-step product tour over an in-memory page. Each step's target is
// watched by selector and highlighted while watched; the third step's
// element does not exist yet when the tour starts, so its watch stays
// pending until the "app" renders it a few frames later. Ending the tour
// restores every element from its style snapshot.
//
// Run with: cargo run --example tour

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use watchdom::{
    load_and_validate, logging, watcher_from_config, Document, ElementRef, Selector,
    WatchCallbacks,
};

const STEPS: &[(&str, &str)] = &[
    (".first-step", "red"),
    (".second-step", "teal"),
    (".third-step", "green"),
];

#[tokio::main]
async fn main() {
    if let Err(err) = run_tour().await {
        eprintln!("tour error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_tour() -> Result<()> {
    logging::init_logging(None)?;

    let config_path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/Tour.toml");
    let cfg = load_and_validate(config_path)?;

    let document = Document::new();
    let main = build_page(&document);

    let (watcher, _clock, _driver) = watcher_from_config(&cfg, document.clone());

    for (selector, color) in STEPS.iter().copied() {
        let callbacks = WatchCallbacks::new()
            .on_watch(move |element| {
                element.set_style("background-color", color);
                info!(step = %element.text(), color, "step highlighted");
            })
            .on_unwatch(|element, snapshot| {
                snapshot.restore(element);
                info!(step = %element.text(), "step restored");
            });
        watcher.watch_detached(selector, callbacks)?;
    }

    let listing = Selector::parse("main > *")?;

    // The first two steps attach on the next frames.
    tokio::time::sleep(cfg.frame_interval() * 4).await;
    dump_page(&document, &listing, "tour running (third step not rendered yet)");

    // The "app" renders the last step late; the pending watch picks it up.
    let third = main.append_element("div");
    third.set_attribute("class", "third-step");
    third.set_text("All done, enjoy!");

    for _ in 0..100 {
        if watcher.tracked_count() == STEPS.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    dump_page(&document, &listing, "all three steps highlighted");

    watcher.unwatch_all();
    dump_page(&document, &listing, "tour ended, styles restored");

    Ok(())
}

fn build_page(document: &Document) -> ElementRef {
    let main = document.append_element(None, "main");

    let first = main.append_element("div");
    first.set_attribute("class", "first-step");
    first.set_attribute("id", "intro");
    first.set_text("Welcome to the tour");

    let second = main.append_element("div");
    second.set_attribute("class", "second-step");
    second.set_text("Settings live here");

    main
}

fn dump_page(document: &Document, listing: &Selector, heading: &str) {
    println!("== {heading}");
    for element in document.query_all(listing) {
        println!(
            "   [{}] {:<22} background-color: {}",
            element.attribute("class").unwrap_or_default(),
            element.text(),
            element.style("background-color"),
        );
    }
    println!();
}
