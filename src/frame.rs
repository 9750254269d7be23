// src/frame.rs

//! Frame scheduling.
//!
//! The resolver retries selector queries once per *frame*, where a frame is
//! one tick of whatever rendering/update loop the host runs. The host owns
//! the pace: it either calls [`FrameClock::advance`] from its own loop, or
//! spawns the interval driver to tick at a fixed period.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Shared handle to the frame counter.
///
/// Cloning is cheap; all clones observe the same frames. Waiters registered
/// via [`next_frame`](FrameClock::next_frame) wake on the next `advance`
/// after they started waiting, never on past frames.
#[derive(Clone)]
pub struct FrameClock {
    tx: Arc<watch::Sender<u64>>,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("frame", &self.frame())
            .finish()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock starting at frame 0.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0u64);
        Self { tx: Arc::new(tx) }
    }

    /// Current frame number.
    pub fn frame(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Advance to the next frame, waking every pending `next_frame` waiter.
    pub fn advance(&self) {
        self.tx.send_modify(|frame| *frame += 1);
        trace!(frame = self.frame(), "frame advanced");
    }

    /// Wait for the next `advance` call.
    ///
    /// An advance that happened before this call does not count; the waiter
    /// always sees a frame strictly later than the one it started on.
    pub async fn next_frame(&self) {
        let mut rx = self.tx.subscribe();
        if rx.changed().await.is_err() {
            // The sender lives at least as long as this borrow of `self`.
            std::future::pending::<()>().await;
        }
    }

    /// Spawn a background task that advances the clock every `period`.
    ///
    /// The returned handle keeps the driver alive; dropping it stops the
    /// driver. The first advance happens one full `period` after the call.
    pub fn spawn_interval_driver(&self, period: Duration) -> FrameDriverHandle {
        let clock = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                clock.advance();
            }
        });

        debug!(period_ms = period.as_millis() as u64, "frame driver started");
        FrameDriverHandle { handle }
    }
}

/// Handle for the background frame driver.
///
/// This exists mainly so the driver task is kept alive for as long as
/// needed. Dropping this handle stops the driver.
pub struct FrameDriverHandle {
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for FrameDriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriverHandle").finish()
    }
}

impl Drop for FrameDriverHandle {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("frame driver stopped");
    }
}
