//! Loading modules through the OS dynamic loader.

use std::path::Path;

use libloading::{Library, Symbol};

use super::abi::{ABI_VERSION, ENTRY_SYMBOL, EntryFn, VERSION_SYMBOL};
use super::{LoadError, Loader, Module};

/// Loader for shared libraries (`.so`, `.dylib`, `.dll`).
#[derive(Debug, Default)]
pub struct DylibLoader;

impl DylibLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for DylibLoader {
    fn load(&mut self, path: &Path) -> Result<Module, LoadError> {
        // SAFETY: running the library's initializers is inherent to hot
        // loading; modules are built from the user's own sources.
        let library =
            unsafe { Library::new(path) }.map_err(|e| LoadError::Open(path.to_path_buf(), e))?;

        let found = {
            // SAFETY: the symbol is documented as a `u32` static.
            let version: Symbol<*const u32> =
                unsafe { library.get(VERSION_SYMBOL.as_bytes()) }.map_err(|e| {
                    LoadError::Symbol {
                        path: path.to_path_buf(),
                        symbol: VERSION_SYMBOL,
                        source: e,
                    }
                })?;
            // SAFETY: the pointer targets the module's static, alive while `library` is.
            unsafe { **version }
        };

        check_version(path, found)?;

        let entry: EntryFn = {
            // SAFETY: the version check above pins the entry signature.
            let symbol: Symbol<EntryFn> =
                unsafe { library.get(ENTRY_SYMBOL.as_bytes()) }.map_err(|e| LoadError::Symbol {
                    path: path.to_path_buf(),
                    symbol: ENTRY_SYMBOL,
                    source: e,
                })?;
            *symbol
        };

        crate::debug!("hot"; "loaded {} (abi v{})", path.display(), found);
        Ok(Module::from_library(path, entry, library))
    }
}

/// Reject modules built against another [`super::SharedState`] layout.
fn check_version(path: &Path, found: u32) -> Result<(), LoadError> {
    if found == ABI_VERSION {
        return Ok(());
    }
    Err(LoadError::Version {
        path: path.to_path_buf(),
        found,
        expected: ABI_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{BuildRequest, CommandCompiler, Compiler, Target};
    use tempfile::TempDir;

    /// Build `source` into a shared library with the system C compiler.
    ///
    /// `None` when no `cc` is installed.
    fn build_module(dir: &TempDir, source: &str) -> Option<std::path::PathBuf> {
        which::which("cc").ok()?;
        let entry = dir.path().join("module.c");
        let output = dir.path().join(format!("module.{}", Target::host().module_ext()));
        std::fs::write(&entry, source).unwrap();

        CommandCompiler::new(vec!["cc".into()], vec![])
            .compile(&BuildRequest {
                entry: &entry,
                output: &output,
                target: Target::host(),
                release: false,
                dynamic: true,
            })
            .unwrap();
        Some(output)
    }

    #[test]
    fn test_check_version() {
        let path = Path::new("hot-1.so");
        assert!(check_version(path, ABI_VERSION).is_ok());

        match check_version(path, ABI_VERSION + 1) {
            Err(LoadError::Version { found, expected, .. }) => {
                assert_eq!(found, ABI_VERSION + 1);
                assert_eq!(expected, ABI_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_library_without_symbols_fails() {
        let mut loader = DylibLoader::new();
        match loader.load(Path::new("libc.so.6")) {
            Err(LoadError::Symbol { symbol, .. }) => assert_eq!(symbol, VERSION_SYMBOL),
            other => panic!("expected missing symbol, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_version_mismatch_fails() {
        let dir = TempDir::new().unwrap();
        let source = format!(
            "const unsigned int hotloop_abi_version = {};\nvoid hotloop_entry(void *state) {{ (void)state; }}\n",
            ABI_VERSION + 7
        );
        // Skipped without a C toolchain
        let Some(path) = build_module(&dir, &source) else {
            return;
        };

        match DylibLoader::new().load(&path) {
            Err(LoadError::Version { found, expected, .. }) => {
                assert_eq!(found, ABI_VERSION + 7);
                assert_eq!(expected, ABI_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_entry_fails() {
        let dir = TempDir::new().unwrap();
        let source = format!("const unsigned int hotloop_abi_version = {ABI_VERSION};\n");
        let Some(path) = build_module(&dir, &source) else {
            return;
        };

        match DylibLoader::new().load(&path) {
            Err(LoadError::Symbol { symbol, .. }) => assert_eq!(symbol, ENTRY_SYMBOL),
            other => panic!("expected missing entry, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_valid_module_loads() {
        let dir = TempDir::new().unwrap();
        let source = format!(
            "const unsigned int hotloop_abi_version = {ABI_VERSION};\nvoid hotloop_entry(void *state) {{ (void)state; }}\n"
        );
        let Some(path) = build_module(&dir, &source) else {
            return;
        };

        let module = DylibLoader::new().load(&path).unwrap();
        assert_eq!(module.path(), path);
    }

    #[test]
    fn test_missing_file_fails() {
        let mut loader = DylibLoader::new();
        let err = loader
            .load(Path::new("/definitely/not/here/hot-1.so"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Open(..)));
    }

    #[test]
    fn test_not_a_library_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("hot-2.so");
        std::fs::write(&path, "int main() { return 0; }\n").unwrap();

        let mut loader = DylibLoader::new();
        assert!(matches!(loader.load(&path), Err(LoadError::Open(..))));
    }
}
