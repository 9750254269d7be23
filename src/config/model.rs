// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::watch::snapshot::SnapshotScope;
use crate::watch::watcher::WatcherOptions;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watcher]
/// snapshot_scope = "interaction"
///
/// [frames]
/// interval_ms = 16
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Watcher behaviour from `[watcher]`.
    #[serde(default)]
    pub watcher: WatcherSection,

    /// Frame pacing from `[frames]`.
    #[serde(default)]
    pub frames: FramesSection,
}

/// `[watcher]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatcherSection {
    /// `"full"` or `"interaction"`.
    ///
    /// - `"full"` (default): preserve an element's entire computed style map
    ///   when a watch attaches.
    /// - `"interaction"`: preserve only `visibility` and `pointer-events`.
    #[serde(default)]
    pub snapshot_scope: SnapshotScope,
}

/// `[frames]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FramesSection {
    /// Milliseconds between frames when the clock is driven on an interval.
    ///
    /// The default of 16 approximates a 60fps animation-frame cadence.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    16
}

impl Default for FramesSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl ConfigFile {
    /// Watcher options derived from the `[watcher]` section.
    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            snapshot_scope: self.watcher.snapshot_scope,
        }
    }

    /// Frame interval derived from the `[frames]` section.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frames.interval_ms)
    }
}
