//! Project configuration management for `hotloop.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── run        # [run]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # config file discovery
//! └── mod.rs         # HotConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults, so
//! `hotloop run main.c` works in an empty directory.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildConfig, RunConfig, WatchConfig};

use util::find_config_file;

use crate::{
    cli::{BuildArgs, Cli},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing hotloop.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// File watching settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Toolchain settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Run loop settings
    #[serde(default)]
    pub run: RunConfig,
}

impl HotConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root
    /// is the config file's parent directory, or cwd when there is none.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let (mut config, root) = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                let root = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                config.config_path = Some(normalize_path(&path));
                (config, root)
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                (Self::default(), cwd.to_path_buf())
            }
        };

        config.validate()?;

        let build_args = cli.build_args();
        if let Some(args) = build_args {
            config.apply_build_args(args);
        }
        config.normalize_paths(&root);
        if cli.watches() {
            config.validate_layout()?;
        }

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI. Flags only ever override.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        self.build.release |= args.release;
        Self::update_option(&mut self.build.output_dir, args.output_dir.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);

        self.watch.paths = self
            .watch
            .paths
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
        self.build.output_dir = normalize_path(&root.join(&self.build.output_dir));
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watch.validate()?;
        self.build.validate()?;
        Ok(())
    }

    /// Artifacts written inside a watched directory would trigger a rebuild
    /// after every build.
    fn validate_layout(&self) -> Result<(), ConfigError> {
        let output = &self.build.output_dir;
        match self.watch.paths.iter().find(|dir| output.starts_with(dir)) {
            Some(dir) => Err(ConfigError::Validation(format!(
                "[build] output_dir `{}` is inside watched directory `{}`",
                output.display(),
                dir.display()
            ))),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> HotConfig {
    let (parsed, ignored) = HotConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
