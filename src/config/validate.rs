// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{Result, WatchdomError};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[frames].interval_ms >= 1` (a zero interval would spin the driver)
///
/// `snapshot_scope` needs no checking here; deserialization already rejects
/// unknown values.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.frames.interval_ms == 0 {
        return Err(WatchdomError::Config(
            "[frames].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
