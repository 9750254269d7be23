// src/watch/watcher.rs

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::document::{Document, ElementRef, Selector, SelectorError};
use crate::frame::FrameClock;
use crate::watch::hash::identity_digest;
use crate::watch::registry::{Firing, WatchCallbacks, WatchKey, WatchRegistry};
use crate::watch::resolver;
use crate::watch::snapshot::{SnapshotScope, StyleSnapshot};

/// What to watch: a direct element reference or a selector string.
#[derive(Debug, Clone)]
pub enum WatchTarget {
    Element(ElementRef),
    Selector(String),
}

impl From<ElementRef> for WatchTarget {
    fn from(element: ElementRef) -> Self {
        WatchTarget::Element(element)
    }
}

impl From<&ElementRef> for WatchTarget {
    fn from(element: &ElementRef) -> Self {
        WatchTarget::Element(element.clone())
    }
}

impl From<&str> for WatchTarget {
    fn from(selector: &str) -> Self {
        WatchTarget::Selector(selector.to_string())
    }
}

impl From<String> for WatchTarget {
    fn from(selector: String) -> Self {
        WatchTarget::Selector(selector)
    }
}

/// How a watch call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The watch attached to this many elements. Direct targets always
    /// attach to exactly one; selectors attach to every current match.
    Attached(usize),
    /// The watcher was torn down before the target could be tracked.
    Cancelled,
}

/// Options that influence how a watcher behaves.
#[derive(Debug, Clone, Default)]
pub struct WatcherOptions {
    /// How much styling to preserve when a watch attaches.
    pub snapshot_scope: SnapshotScope,
}

/// State shared between the watcher handle and detached watch tasks.
///
/// Detached tasks hold an `Arc` to this rather than to the watcher itself,
/// so dropping the sole [`ElementWatcher`] still triggers teardown while
/// in-flight resolutions wind down via the cancellation token.
struct WatcherShared {
    document: Document,
    clock: FrameClock,
    options: WatcherOptions,
    cancel: CancellationToken,
    registry: Mutex<WatchRegistry>,
}

impl WatcherShared {
    fn watch_element(&self, element: ElementRef, callbacks: Arc<WatchCallbacks>) -> WatchOutcome {
        let snapshot = StyleSnapshot::capture(&element, self.options.snapshot_scope);
        let firing = {
            let mut registry = self.registry.lock();
            registry.insert_direct(element, callbacks, snapshot)
        };
        match firing {
            Some(firing) => {
                firing.run();
                debug!("direct watch attached");
                WatchOutcome::Attached(1)
            }
            None => {
                debug!("watcher already released, direct watch dropped");
                WatchOutcome::Cancelled
            }
        }
    }

    async fn watch_selector(
        &self,
        selector: Selector,
        callbacks: Arc<WatchCallbacks>,
    ) -> WatchOutcome {
        let matches = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!(selector = %selector, "watch cancelled before a match");
                return WatchOutcome::Cancelled;
            }
            matches = resolver::resolve(&self.document, &self.clock, &selector) => matches,
        };
        self.install_matches(&selector, matches, callbacks)
    }

    fn install_matches(
        &self,
        selector: &Selector,
        matches: Vec<ElementRef>,
        callbacks: Arc<WatchCallbacks>,
    ) -> WatchOutcome {
        // Digests and snapshots read the document, so compute them before
        // taking the registry lock.
        let prepared: Vec<(WatchKey, ElementRef, StyleSnapshot)> = matches
            .into_iter()
            .map(|element| {
                let key = WatchKey::new(selector.source(), identity_digest(&element));
                let snapshot = StyleSnapshot::capture(&element, self.options.snapshot_scope);
                (key, element, snapshot)
            })
            .collect();

        let mut attached = 0usize;
        let mut firings: Vec<Firing> = Vec::new();
        {
            let mut registry = self.registry.lock();
            for (key, element, snapshot) in prepared {
                match registry.install_match(key, element, callbacks.clone(), snapshot) {
                    Some(mut owed) => {
                        attached += 1;
                        firings.append(&mut owed);
                    }
                    // Torn down between resolution and install; nothing is
                    // tracked, so nothing will fire.
                    None => break,
                }
            }
        }
        for firing in &firings {
            firing.run();
        }

        if attached == 0 {
            debug!(selector = %selector, "watcher released before install, matches dropped");
            WatchOutcome::Cancelled
        } else {
            debug!(selector = %selector, attached, "selector watch attached");
            WatchOutcome::Attached(attached)
        }
    }

    fn release_all(&self) {
        // Cancel first so resolvers stop re-querying, then drain under the
        // lock and fire everything after it is released.
        self.cancel.cancel();
        let firings = self.registry.lock().release_all();
        if !firings.is_empty() {
            info!(count = firings.len(), "unwatching all elements");
        }
        for firing in &firings {
            firing.run();
        }
    }
}

/// Watches elements in a [`Document`] and fires lifecycle callbacks.
///
/// A watcher is constructed once per owning scope (the analogue of one
/// component instance) and tracks everything watched through it until
/// [`ElementWatcher::unwatch_all`] runs or the watcher is dropped, whichever
/// comes first. There is no way to unwatch a single element.
///
/// Selector targets that have no match yet are retried every frame of the
/// supplied [`FrameClock`] until they match or the watcher is torn down.
pub struct ElementWatcher {
    shared: Arc<WatcherShared>,
}

impl fmt::Debug for ElementWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementWatcher").finish_non_exhaustive()
    }
}

impl ElementWatcher {
    pub fn new(document: Document, clock: FrameClock) -> Self {
        Self::with_options(document, clock, WatcherOptions::default())
    }

    pub fn with_options(document: Document, clock: FrameClock, options: WatcherOptions) -> Self {
        Self {
            shared: Arc::new(WatcherShared {
                document,
                clock,
                options,
                cancel: CancellationToken::new(),
                registry: Mutex::new(WatchRegistry::new()),
            }),
        }
    }

    /// Watch a direct element or everything matching a selector.
    ///
    /// Direct targets attach immediately. Selector targets resolve against
    /// the document first; if nothing matches yet this future waits, frame
    /// by frame, until something does or the watcher is torn down. Selector
    /// compilation errors surface before any waiting happens.
    pub async fn watch(
        &self,
        target: impl Into<WatchTarget>,
        callbacks: WatchCallbacks,
    ) -> Result<WatchOutcome, SelectorError> {
        let callbacks = Arc::new(callbacks);
        match target.into() {
            WatchTarget::Element(element) => Ok(self.shared.watch_element(element, callbacks)),
            WatchTarget::Selector(source) => {
                let selector = Selector::parse(&source)?;
                Ok(self.shared.watch_selector(selector, callbacks).await)
            }
        }
    }

    /// Start a watch without awaiting resolution.
    ///
    /// The selector is still compiled eagerly, so errors surface here; the
    /// resolution itself proceeds in a background task that teardown
    /// cancels. This is the fire-and-forget flavour of [`Self::watch`].
    pub fn watch_detached(
        &self,
        target: impl Into<WatchTarget>,
        callbacks: WatchCallbacks,
    ) -> Result<(), SelectorError> {
        let callbacks = Arc::new(callbacks);
        match target.into() {
            WatchTarget::Element(element) => {
                self.shared.watch_element(element, callbacks);
                Ok(())
            }
            WatchTarget::Selector(source) => {
                let selector = Selector::parse(&source)?;
                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move {
                    shared.watch_selector(selector, callbacks).await;
                });
                Ok(())
            }
        }
    }

    /// Release every watched element, firing `on_unwatch` once for each.
    ///
    /// Direct entries fire first (in watch order), then selector entries
    /// (in install order). In-flight selector resolutions are cancelled,
    /// and watches issued afterwards report [`WatchOutcome::Cancelled`].
    /// Calling this more than once is harmless.
    pub fn unwatch_all(&self) {
        self.shared.release_all();
    }

    /// Number of currently tracked entries.
    pub fn tracked_count(&self) -> usize {
        self.shared.registry.lock().tracked_count()
    }

    /// Whether teardown already ran.
    pub fn is_released(&self) -> bool {
        self.shared.registry.lock().is_released()
    }
}

impl Drop for ElementWatcher {
    fn drop(&mut self) {
        // Dropping the watcher is the teardown trigger, mirroring an owner
        // going out of scope. Explicit unwatch_all beforehand is fine;
        // release_all is idempotent.
        self.shared.release_all();
    }
}
