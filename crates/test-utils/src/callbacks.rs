use std::sync::{Arc, Mutex};

use tracing::debug;
use watchdom::{ElementRef, StyleSnapshot, WatchCallbacks};

/// One recorded lifecycle invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    Watch {
        element: ElementRef,
    },
    Unwatch {
        element: ElementRef,
        snapshot: StyleSnapshot,
    },
}

/// Records lifecycle callback invocations for assertions.
///
/// Clones share the same log, so one recorder can feed callbacks into
/// several watch calls while the test keeps a handle for assertions.
#[derive(Clone, Default)]
pub struct CallbackRecorder {
    events: Arc<Mutex<Vec<CallbackEvent>>>,
}

impl CallbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks that log into this recorder.
    pub fn callbacks(&self) -> WatchCallbacks {
        let watch_log = Arc::clone(&self.events);
        let unwatch_log = Arc::clone(&self.events);
        WatchCallbacks::new()
            .on_watch(move |element| {
                debug!(?element, "recorder saw on_watch");
                watch_log.lock().unwrap().push(CallbackEvent::Watch {
                    element: element.clone(),
                });
            })
            .on_unwatch(move |element, snapshot| {
                debug!(?element, "recorder saw on_unwatch");
                unwatch_log.lock().unwrap().push(CallbackEvent::Unwatch {
                    element: element.clone(),
                    snapshot: snapshot.clone(),
                });
            })
    }

    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn watch_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CallbackEvent::Watch { .. }))
            .count()
    }

    pub fn unwatch_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CallbackEvent::Unwatch { .. }))
            .count()
    }

    /// Elements passed to `on_watch`, in invocation order.
    pub fn watched_elements(&self) -> Vec<ElementRef> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CallbackEvent::Watch { element } => Some(element),
                _ => None,
            })
            .collect()
    }

    /// Element/snapshot pairs passed to `on_unwatch`, in invocation order.
    pub fn unwatched(&self) -> Vec<(ElementRef, StyleSnapshot)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CallbackEvent::Unwatch { element, snapshot } => Some((element, snapshot)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
