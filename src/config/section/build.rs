//! `[build]` section configuration.
//!
//! Contains the toolchain invocation and artifact location.
//!
//! # Example
//!
//! ```toml
//! [build]
//! compiler = ["zig", "cc"]    # Program plus leading arguments
//! flags = ["-Wall", "-Iinclude"]
//! output_dir = "out"          # Where hot-*.so artifacts are written
//! release = false             # Optimized builds
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compiler program followed by any leading arguments.
    pub compiler: Vec<String>,

    /// Extra flags passed on every build.
    pub flags: Vec<String>,

    /// Artifact directory, relative to the project root.
    pub output_dir: PathBuf,

    /// Build with optimizations.
    pub release: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: vec!["clang".into()],
            flags: Vec::new(),
            output_dir: PathBuf::from("out"),
            release: false,
        }
    }
}

impl BuildConfig {
    pub(in crate::config) fn validate(&self) -> Result<(), ConfigError> {
        match self.compiler.first() {
            Some(program) if !program.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::Validation(
                "[build] compiler must name a program".into(),
            )),
        }
    }
}
