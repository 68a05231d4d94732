//! Common setup shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::TargetArgs;
use crate::compiler::{BuildRequest, CommandCompiler, Target};
use crate::config::HotConfig;
use crate::log;
use crate::utils::path::resolve_path;
use crate::watch::Watcher;

/// Resolve the entry source and make sure it exists.
pub fn resolve_entry(config: &HotConfig, entry: &Path) -> Result<PathBuf> {
    let path = resolve_path(entry, config.get_root());
    if !path.is_file() {
        bail!("entry source `{}` not found", entry.display());
    }
    Ok(path)
}

/// Everything a standalone build needs, resolved against the config.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub entry: PathBuf,
    pub output: PathBuf,
    pub target: Target,
    pub release: bool,
    pub dynamic: bool,
}

impl BuildPlan {
    pub fn new(config: &HotConfig, entry: &Path, args: &TargetArgs) -> Result<Self> {
        let entry = resolve_entry(config, entry)?;
        let target = args.target.unwrap_or_else(Target::host);

        let output = match &args.out {
            Some(out) => config.get_root().join(out),
            None => {
                let stem = entry
                    .file_stem()
                    .map_or_else(|| "main".into(), |s| s.to_string_lossy());
                config
                    .build
                    .output_dir
                    .join(target.artifact_name(&stem, args.dynamic))
            }
        };

        Ok(Self {
            entry,
            output,
            target,
            release: config.build.release,
            dynamic: args.dynamic,
        })
    }

    pub fn request(&self) -> BuildRequest<'_> {
        BuildRequest {
            entry: &self.entry,
            output: &self.output,
            target: self.target,
            release: self.release,
            dynamic: self.dynamic,
        }
    }

    /// Create the directory the artifact is written to.
    pub fn create_output_dir(&self) -> Result<()> {
        if let Some(dir) = self.output.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Compiler from the `[build]` section, checked to be installed.
pub fn command_compiler(config: &HotConfig) -> Result<CommandCompiler> {
    let program = config
        .build
        .compiler
        .first()
        .context("[build] compiler is empty")?;

    if which::which(program).is_err() {
        bail!("compiler `{program}` not found in PATH (set [build] compiler in hotloop.toml)");
    }

    Ok(
        CommandCompiler::new(config.build.compiler.clone(), config.build.flags.clone())
            .with_cwd(config.get_root()),
    )
}

/// Watcher subscribed to every configured watch path.
///
/// Any registration failure is fatal: a loop that silently misses changes
/// is worse than no loop.
pub fn start_watcher(config: &HotConfig) -> Result<Watcher> {
    let mut watcher =
        Watcher::new(config.watch.debounce()).context("failed to start file watcher")?;

    for path in &config.watch.paths {
        watcher
            .register(path)
            .with_context(|| format!("failed to watch {}", path.display()))?;
    }

    log!(
        "watch";
        "watching {} director{}",
        watcher.watched().len(),
        if watcher.watched().len() == 1 { "y" } else { "ies" }
    );
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_entry_missing() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();

        assert!(resolve_entry(&config, Path::new("hotloop-missing-main.c")).is_err());

        std::fs::write(dir.path().join("hotloop-present-main.c"), "").unwrap();
        let entry = resolve_entry(&config, Path::new("hotloop-present-main.c")).unwrap();
        assert!(entry.is_absolute());
    }

    #[test]
    fn test_build_plan_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("game.c"), "").unwrap();
        let mut config = test_parse_config("[build]\nrelease = true");
        config.root = dir.path().to_path_buf();
        config.build.output_dir = dir.path().join("out");

        let plan = BuildPlan::new(&config, Path::new("game.c"), &TargetArgs::default()).unwrap();
        assert_eq!(plan.target, Target::host());
        assert!(plan.release && !plan.dynamic);
        assert_eq!(
            plan.output,
            dir.path().join("out").join(Target::host().artifact_name("game", false))
        );

        plan.create_output_dir().unwrap();
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn test_build_plan_target_and_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("game.c"), "").unwrap();
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();

        let args = TargetArgs {
            target: Some(Target::Wasm),
            dynamic: true,
            out: Some(PathBuf::from("web/game.wasm")),
        };
        let plan = BuildPlan::new(&config, Path::new("game.c"), &args).unwrap();
        assert_eq!(plan.output, dir.path().join("web/game.wasm"));

        let request = plan.request();
        assert_eq!(request.target, Target::Wasm);
        assert!(request.dynamic);
    }

    #[test]
    fn test_missing_compiler() {
        let config = test_parse_config("[build]\ncompiler = [\"hotloop-no-such-cc\"]");
        assert!(command_compiler(&config).is_err());
    }

    #[test]
    fn test_start_watcher_missing_path_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.watch.paths = vec![dir.path().join("does-not-exist")];
        assert!(start_watcher(&config).is_err());
    }

    #[test]
    fn test_start_watcher_registers_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/render")).unwrap();
        let mut config = test_parse_config("");
        config.watch.paths = vec![dir.path().join("src")];

        let watcher = start_watcher(&config).unwrap();
        assert_eq!(watcher.watched().len(), 2);
    }
}
