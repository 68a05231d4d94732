//! Unique artifact names.
//!
//! Most loaders refuse to map the same path twice while the first mapping
//! is alive, and superseded modules are never unmapped. Every build
//! therefore gets a fresh file name.

use std::time::SystemTime;

use crate::compiler::Target;

/// Generates `hot-<unix-ms>-<counter>.<ext>` file names.
#[derive(Debug)]
pub struct OutputNamer {
    ext: &'static str,
    counter: u64,
}

impl OutputNamer {
    pub fn new(target: Target) -> Self {
        Self {
            ext: target.module_ext(),
            counter: 0,
        }
    }

    /// Next file name; never repeats within a process.
    pub fn next_name(&mut self) -> String {
        self.counter += 1;
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        format!("hot-{millis}-{}.{}", self.counter, self.ext)
    }
}
