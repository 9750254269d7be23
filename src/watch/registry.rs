// src/watch/registry.rs

//! Pure bookkeeping core for watched elements.
//!
//! This module contains a synchronous, deterministic registry that consumes
//! install/release calls and produces:
//! - updated tracking state
//! - a list of [`Firing`]s describing which callbacks the caller owes
//!
//! The async shell (`watch::watcher`) is responsible for:
//! - resolving selectors against the document
//! - holding the lock around registry calls
//! - running the returned firings *after* the lock is released
//!
//! The registry itself never invokes callbacks and performs no IO, so it can
//! be unit tested without Tokio or a frame clock.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::ElementRef;
use crate::watch::snapshot::StyleSnapshot;

/// Callbacks attached to a watch request.
///
/// Both callbacks are optional. `on_watch` fires when an element is first
/// tracked (and again on every re-match of the same key); `on_unwatch` fires
/// exactly once per release, with the style snapshot taken when the entry
/// was first installed.
#[derive(Default)]
pub struct WatchCallbacks {
    on_watch: Option<Box<dyn Fn(&ElementRef) + Send + Sync>>,
    on_unwatch: Option<Box<dyn Fn(&ElementRef, &StyleSnapshot) + Send + Sync>>,
}

impl WatchCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_watch(mut self, f: impl Fn(&ElementRef) + Send + Sync + 'static) -> Self {
        self.on_watch = Some(Box::new(f));
        self
    }

    pub fn on_unwatch(
        mut self,
        f: impl Fn(&ElementRef, &StyleSnapshot) + Send + Sync + 'static,
    ) -> Self {
        self.on_unwatch = Some(Box::new(f));
        self
    }

    fn fire_watch(&self, element: &ElementRef) {
        if let Some(f) = &self.on_watch {
            f(element);
        }
    }

    fn fire_unwatch(&self, element: &ElementRef, snapshot: &StyleSnapshot) {
        if let Some(f) = &self.on_unwatch {
            f(element, snapshot);
        }
    }
}

impl fmt::Debug for WatchCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCallbacks")
            .field("on_watch", &self.on_watch.is_some())
            .field("on_unwatch", &self.on_unwatch.is_some())
            .finish()
    }
}

/// Identity key for a selector-based entry: the selector string plus the
/// digest of the matched element's identifying content.
///
/// Keying on identity rather than on the element itself is what lets a
/// re-rendered replacement node be recognised as "the same thing".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchKey {
    selector: String,
    digest: String,
}

impl WatchKey {
    pub fn new(selector: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            digest: digest.into(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for WatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.selector, self.digest)
    }
}

/// One tracked entry: the element, the callbacks to notify, and the style
/// snapshot taken when the entry was first installed.
#[derive(Debug)]
struct WatchedItem {
    element: ElementRef,
    callbacks: Arc<WatchCallbacks>,
    snapshot: StyleSnapshot,
}

/// One callback invocation owed to the caller.
///
/// Firings are produced under the registry lock and must be run after it is
/// released, so a callback is free to re-enter the watcher.
#[derive(Debug)]
pub enum Firing {
    Watch {
        element: ElementRef,
        callbacks: Arc<WatchCallbacks>,
    },
    Unwatch {
        element: ElementRef,
        callbacks: Arc<WatchCallbacks>,
        snapshot: StyleSnapshot,
    },
}

impl Firing {
    pub fn run(&self) {
        match self {
            Firing::Watch { element, callbacks } => callbacks.fire_watch(element),
            Firing::Unwatch {
                element,
                callbacks,
                snapshot,
            } => callbacks.fire_unwatch(element, snapshot),
        }
    }
}

/// Tracking state for one watcher instance.
///
/// This owns:
/// - the directly watched elements, in watch order
/// - the selector-keyed entries, in first-install order
/// - the released flag set by bulk teardown
///
/// It has **no** channels, no Tokio types, and never runs callbacks itself.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    direct: Vec<WatchedItem>,
    keyed: IndexMap<WatchKey, WatchedItem>,
    released: bool,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether bulk teardown already ran.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Number of currently tracked entries (direct plus selector-keyed).
    pub fn tracked_count(&self) -> usize {
        self.direct.len() + self.keyed.len()
    }

    /// Track a directly supplied element.
    ///
    /// Every call adds a fresh entry; direct watches are never deduplicated.
    /// Returns the `on_watch` firing, or `None` when the registry was
    /// already released.
    pub fn insert_direct(
        &mut self,
        element: ElementRef,
        callbacks: Arc<WatchCallbacks>,
        snapshot: StyleSnapshot,
    ) -> Option<Firing> {
        if self.released {
            return None;
        }
        self.direct.push(WatchedItem {
            element: element.clone(),
            callbacks: callbacks.clone(),
            snapshot,
        });
        Some(Firing::Watch { element, callbacks })
    }

    /// Install (or re-install) a selector match under its identity key.
    ///
    /// If the key is already present with a *different* element, the old
    /// entry's `on_unwatch` is owed first; its snapshot survives the
    /// replacement either way, so the styles preserved are always the ones
    /// from the very first install of this key. Returns `None` when the
    /// registry was already released.
    pub fn install_match(
        &mut self,
        key: WatchKey,
        element: ElementRef,
        callbacks: Arc<WatchCallbacks>,
        fresh_snapshot: StyleSnapshot,
    ) -> Option<Vec<Firing>> {
        if self.released {
            return None;
        }

        let mut firings = Vec::new();
        let snapshot = match self.keyed.get(&key) {
            Some(existing) => {
                if existing.element != element {
                    firings.push(Firing::Unwatch {
                        element: existing.element.clone(),
                        callbacks: existing.callbacks.clone(),
                        snapshot: existing.snapshot.clone(),
                    });
                }
                existing.snapshot.clone()
            }
            None => fresh_snapshot,
        };

        self.keyed.insert(
            key,
            WatchedItem {
                element: element.clone(),
                callbacks: callbacks.clone(),
                snapshot,
            },
        );
        firings.push(Firing::Watch { element, callbacks });
        Some(firings)
    }

    /// Release every tracked entry and clear the registry.
    ///
    /// Direct entries are owed their `on_unwatch` first (in watch order),
    /// then selector-keyed entries (in install order). Subsequent calls are
    /// no-ops, and subsequent installs are refused.
    pub fn release_all(&mut self) -> Vec<Firing> {
        self.released = true;

        let mut firings = Vec::with_capacity(self.direct.len() + self.keyed.len());
        for item in self.direct.drain(..) {
            firings.push(Firing::Unwatch {
                element: item.element,
                callbacks: item.callbacks,
                snapshot: item.snapshot,
            });
        }
        for (_, item) in self.keyed.drain(..) {
            firings.push(Firing::Unwatch {
                element: item.element,
                callbacks: item.callbacks,
                snapshot: item.snapshot,
            });
        }
        firings
    }
}
