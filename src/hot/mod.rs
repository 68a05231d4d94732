//! Hot Loader
//!
//! Loads freshly built modules and swaps the active entry point without
//! restarting the host. A failed load never touches the running module:
//! the last good build keeps serving until a new one loads cleanly.

mod abi;
mod dylib;
mod host;
mod leak;

use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;

pub use abi::{EntryFn, SharedState};
#[cfg(test)]
pub use abi::ENTRY_SYMBOL;
pub use dylib::DylibLoader;
pub use host::HostState;
pub use leak::Leaked;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open module `{0}`")]
    Open(PathBuf, #[source] libloading::Error),

    #[error("module `{path}` does not export `{symbol}`")]
    Symbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("module `{path}` uses ABI version {found}, expected {expected}")]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Something that turns a built artifact into a callable [`Module`].
pub trait Loader {
    fn load(&mut self, path: &Path) -> Result<Module, LoadError>;
}

/// A loaded module with its resolved entry point.
pub struct Module {
    path: PathBuf,
    entry: EntryFn,
    /// Keeps the code behind `entry` mapped; never unloaded
    _library: Option<Leaked<Library>>,
}

impl Module {
    pub(crate) fn from_library(path: &Path, entry: EntryFn, library: Library) -> Self {
        Self {
            path: path.to_path_buf(),
            entry,
            _library: Some(Leaked::new(library)),
        }
    }

    /// Module whose code is linked into this process.
    #[cfg(test)]
    pub(crate) fn in_process(path: impl Into<PathBuf>, entry: EntryFn) -> Self {
        Self {
            path: path.into(),
            entry,
            _library: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module").field("path", &self.path).finish()
    }
}

/// The slot holding the active module.
///
/// Only the orchestrator writes the slot and the `reloaded` flag.
#[derive(Debug, Default)]
pub struct Hot {
    current: Option<Module>,
    swaps: u64,
}

impl Hot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` and swap it in; on failure the active module stays.
    pub fn reload(
        &mut self,
        loader: &mut impl Loader,
        path: &Path,
        state: &mut SharedState,
    ) -> Result<(), LoadError> {
        let module = loader.load(path)?;
        self.swap(module, state);
        Ok(())
    }

    /// Make `module` the active one and flag the next call as a reload.
    pub fn swap(&mut self, module: Module, state: &mut SharedState) {
        state.reloaded = true;
        self.swaps += 1;
        if let Some(old) = self.current.replace(module) {
            crate::debug!("hot"; "superseded {}", old.path.display());
        }
    }

    /// Call the active module once. Returns `false` if none is loaded.
    pub fn invoke(&mut self, state: &mut SharedState) -> bool {
        let Some(module) = &self.current else {
            return false;
        };

        // SAFETY: `entry` was resolved against a matching ABI version and
        // its library is leaked, so the code stays mapped.
        unsafe { (module.entry)(state) };
        state.reloaded = false;
        true
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Module> {
        self.current.as_ref()
    }

    /// Number of successful swaps so far.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}
