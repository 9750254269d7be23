// src/lib.rs

pub mod config;
pub mod document;
pub mod errors;
pub mod frame;
pub mod logging;
pub mod watch;

pub use crate::config::{default_config_path, load_and_validate, load_from_path, ConfigFile};
pub use crate::document::{Document, ElementRef, Selector, SelectorError, SelectorErrorKind};
pub use crate::errors::{Result, WatchdomError};
pub use crate::frame::{FrameClock, FrameDriverHandle};
pub use crate::watch::{
    ElementWatcher, SnapshotScope, StyleSnapshot, WatchCallbacks, WatchOutcome, WatchTarget,
    WatcherOptions,
};

/// High-level wiring used by callers that drive frames on a wall-clock
/// interval.
///
/// This puts together:
/// - a fresh [`FrameClock`]
/// - an interval driver paced by `[frames].interval_ms`
/// - an [`ElementWatcher`] configured from `[watcher]`
///
/// The driver stops when the returned handle drops; callers that advance
/// frames manually (tests, deterministic simulations) should construct the
/// pieces themselves instead.
pub fn watcher_from_config(
    cfg: &ConfigFile,
    document: Document,
) -> (ElementWatcher, FrameClock, FrameDriverHandle) {
    let clock = FrameClock::new();
    let driver = clock.spawn_interval_driver(cfg.frame_interval());
    let watcher = ElementWatcher::with_options(document, clock.clone(), cfg.watcher_options());
    (watcher, clock, driver)
}
