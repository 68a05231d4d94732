//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! paths = ["src", "include"]  # Directories to watch (recursively at startup)
//! debounce_ms = 50            # Quiet period that ends a burst of changes
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::watch::DEBOUNCE_MS;

/// File watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directories to watch, relative to the project root.
    pub paths: Vec<PathBuf>,

    /// Debounce quantum in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from("src")],
            debounce_ms: DEBOUNCE_MS,
        }
    }
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub(in crate::config) fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.is_empty() {
            return Err(ConfigError::Validation(
                "[watch] paths must name at least one directory".into(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "[watch] debounce_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
