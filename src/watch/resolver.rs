// src/watch/resolver.rs

//! Frame-paced selector resolution.

use tracing::trace;

use crate::document::{Document, ElementRef, Selector};
use crate::frame::FrameClock;

/// Resolve a selector against the document, retrying every frame until at
/// least one element matches.
///
/// The first query runs immediately; if nothing matches, the query re-runs
/// after every subsequent frame, indefinitely. There is no backoff and no
/// match timeout. Cancellation is the caller's concern: the watcher races
/// this future against its shutdown token.
pub async fn resolve(
    document: &Document,
    clock: &FrameClock,
    selector: &Selector,
) -> Vec<ElementRef> {
    loop {
        let matches = document.query_all(selector);
        if !matches.is_empty() {
            return matches;
        }
        trace!(selector = %selector, frame = clock.frame(), "no match, retrying next frame");
        clock.next_frame().await;
    }
}
