// src/watch/mod.rs

//! Element watching and lifecycle callbacks.
//!
//! This module is responsible for:
//! - Tracking watched elements per watcher instance (`registry.rs`).
//! - Resolving selector targets frame by frame (`resolver.rs`).
//! - Deriving identity digests for matched elements (`hash.rs`).
//! - Capturing and restoring style snapshots (`snapshot.rs`).
//! - The public [`ElementWatcher`] shell tying it together (`watcher.rs`).
//!
//! It does **not** observe document mutations; selectors are re-queried on
//! frames, and an element that disappears after attaching stays tracked
//! until teardown.

pub mod hash;
pub mod registry;
pub mod resolver;
pub mod snapshot;
pub mod watcher;

pub use hash::{digest_str, identity_digest};
pub use registry::{Firing, WatchCallbacks, WatchKey, WatchRegistry};
pub use snapshot::{camelize, SnapshotScope, StyleSnapshot};
pub use watcher::{ElementWatcher, WatchOutcome, WatchTarget, WatcherOptions};
