//! Change Watcher
//!
//! Subscribes to filesystem notifications and turns bursts of them into a
//! single edge-triggered change event.
//!
//! ```text
//! notify backend → mpsc channel → poll(): drain → sleep → drain … → bool
//! ```
//!
//! States: `Idle → PendingDebounce → Idle`. A poll that finds nothing returns
//! `false` immediately. A poll that finds something keeps sleeping for one
//! debounce quantum and draining again until a drain comes back empty, so an
//! editor's atomic rename or a bulk write triggers one rebuild, not ten.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use jwalk::WalkDir;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;

mod filter;


use filter::classify;

/// Default debounce quantum.
pub const DEBOUNCE_MS: u64 = 50;

type NotifyRx = Receiver<notify::Result<notify::Event>>;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to start the file watcher")]
    Init(#[source] notify::Error),

    #[error("watch path `{0}` does not exist")]
    Missing(PathBuf),

    #[error("failed to watch `{0}`")]
    Add(PathBuf, #[source] notify::Error),
}

/// A set of watched directories with one notification queue.
pub struct Watcher {
    /// Queue filled by the backend thread
    rx: NotifyRx,
    /// Backend handle (must be kept alive); `None` when fed by hand
    backend: Option<RecommendedWatcher>,
    /// Every directory subscribed so far
    watched: Vec<PathBuf>,
    quantum: Duration,
}

impl Watcher {
    /// Create a watcher with an empty watch set.
    pub fn new(quantum: Duration) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let backend = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(WatchError::Init)?;

        Ok(Self {
            rx,
            backend: Some(backend),
            watched: Vec::new(),
            quantum,
        })
    }

    /// Watcher reading from a hand-fed queue instead of the OS.
    #[cfg(test)]
    pub(crate) fn from_receiver(rx: NotifyRx, quantum: Duration) -> Self {
        Self {
            rx,
            backend: None,
            watched: Vec::new(),
            quantum,
        }
    }

    /// Subscribe to create/modify/delete events of `path`.
    ///
    /// Subdirectories that exist right now are subscribed as well; ones
    /// created later are not.
    pub fn register(&mut self, path: &Path) -> Result<(), WatchError> {
        if !path.is_dir() {
            return Err(WatchError::Missing(path.to_path_buf()));
        }

        let dirs: Vec<PathBuf> = WalkDir::new(path)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.path())
            .collect();

        for dir in dirs {
            if let Some(backend) = self.backend.as_mut() {
                backend
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(|e| WatchError::Add(dir.clone(), e))?;
            }
            crate::debug!("watch"; "watching {}", dir.display());
            self.watched.push(dir);
        }

        Ok(())
    }

    /// Check for changes.
    ///
    /// Returns `true` at most once per burst of changes.
    pub fn poll(&mut self) -> bool {
        if self.drain() == 0 {
            return false;
        }

        // Something changed, debounce
        loop {
            std::thread::sleep(self.quantum);
            if self.drain() == 0 {
                return true;
            }
        }
    }

    /// Directories currently subscribed.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Consume every queued event without blocking; returns the relevant count.
    fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(event) => {
                    if let Some(kind) = classify(&event) {
                        crate::debug!("watch"; "{}: {:?}", kind.label(), event.paths);
                        count += 1;
                    }
                }
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        }
        count
    }
}
