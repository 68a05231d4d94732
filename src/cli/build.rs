//! `hotloop build`: compile once and exit.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};

use super::TargetArgs;
use super::common::{BuildPlan, command_compiler};
use crate::compiler::Compiler;
use crate::config::HotConfig;
use crate::log;

pub fn build_entry(config: &HotConfig, entry: &Path, target: &TargetArgs) -> Result<()> {
    let plan = BuildPlan::new(config, entry, target)?;
    let mut compiler = command_compiler(config)?;
    build_plan(&mut compiler, &plan)
}

fn build_plan(compiler: &mut impl Compiler, plan: &BuildPlan) -> Result<()> {
    plan.create_output_dir()?;

    let started = Instant::now();
    compiler
        .compile(&plan.request())
        .map_err(|e| anyhow!(e.detail()))
        .with_context(|| format!("failed to build {}", plan.entry.display()))?;

    log!(
        "build";
        "built {} ({:?}) in {}ms",
        plan.output.display(),
        plan.target,
        started.elapsed().as_millis()
    );
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::compiler::{CommandCompiler, Target};
    use tempfile::TempDir;

    fn plan(dir: &TempDir) -> BuildPlan {
        std::fs::write(dir.path().join("main.c"), "").unwrap();
        BuildPlan {
            entry: dir.path().join("main.c"),
            output: dir.path().join("out/nested/main"),
            target: Target::host(),
            release: true,
            dynamic: false,
        }
    }

    #[test]
    fn test_build_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let mut compiler =
            CommandCompiler::new(vec!["sh".into(), "-c".into(), "exit 0".into()], vec![]);

        build_plan(&mut compiler, &plan(&dir)).unwrap();
        assert!(dir.path().join("out/nested").is_dir());
    }

    #[test]
    fn test_build_failure_carries_diagnostics() {
        let dir = TempDir::new().unwrap();
        let script = "echo 'main.c:2:5: error: boom' >&2; exit 1";
        let mut compiler =
            CommandCompiler::new(vec!["sh".into(), "-c".into(), script.into()], vec![]);

        let err = build_plan(&mut compiler, &plan(&dir)).unwrap_err();
        assert!(err.to_string().starts_with("failed to build"));
        assert_eq!(err.root_cause().to_string(), "main.c:2:5: error: boom");
    }
}
