//! `[run]` section configuration.
//!
//! ```toml
//! [run]
//! sleep_ms = 100   # Initial tick interval; modules may change it
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Initial delay between module calls in milliseconds.
    pub sleep_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { sleep_ms: 100 }
    }
}

impl RunConfig {
    pub const fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }
}
