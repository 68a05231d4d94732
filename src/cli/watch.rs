//! `hotloop watch`: rebuild an artifact on every change.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use super::TargetArgs;
use super::common::{BuildPlan, command_compiler, start_watcher};
use crate::compiler::Compiler;
use crate::config::HotConfig;
use crate::core::is_shutdown;
use crate::logger::{status_error, status_success};

pub fn watch_build(config: &HotConfig, entry: &Path, target: &TargetArgs) -> Result<()> {
    let plan = BuildPlan::new(config, entry, target)?;
    let mut compiler = command_compiler(config)?;
    let mut watcher = start_watcher(config)?;
    plan.create_output_dir()?;

    let mut first = true;
    while !is_shutdown() {
        if std::mem::take(&mut first) || watcher.poll() {
            build_once(&mut compiler, &plan);
        }
        std::thread::sleep(config.watch.debounce());
    }
    Ok(())
}

fn build_once(compiler: &mut impl Compiler, plan: &BuildPlan) -> bool {
    let started = Instant::now();
    match compiler.compile(&plan.request()) {
        Ok(()) => {
            status_success(&format!(
                "built {} in {}ms",
                plan.output.display(),
                started.elapsed().as_millis()
            ));
            true
        }
        Err(e) => {
            status_error(&format!("build failed: {}", plan.entry.display()), &e.detail());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{BuildRequest, CompileError, Target};
    use std::path::PathBuf;

    struct Recorder(Vec<(PathBuf, Target, bool)>);

    impl Compiler for Recorder {
        fn compile(&mut self, request: &BuildRequest<'_>) -> Result<(), CompileError> {
            self.0
                .push((request.output.to_path_buf(), request.target, request.dynamic));
            Ok(())
        }
    }

    fn plan(target: Target, dynamic: bool) -> BuildPlan {
        BuildPlan {
            entry: PathBuf::from("main.c"),
            output: PathBuf::from("out/main"),
            target,
            release: false,
            dynamic,
        }
    }

    #[test]
    fn test_build_once_defaults_to_static_host() {
        let mut compiler = Recorder(Vec::new());
        assert!(build_once(&mut compiler, &plan(Target::host(), false)));
        assert_eq!(
            compiler.0,
            [(PathBuf::from("out/main"), Target::host(), false)]
        );
    }

    #[test]
    fn test_build_once_passes_target() {
        let mut compiler = Recorder(Vec::new());
        assert!(build_once(&mut compiler, &plan(Target::Wasm, true)));
        assert_eq!(compiler.0[0].1, Target::Wasm);
        assert!(compiler.0[0].2);
    }

    #[test]
    fn test_build_once_reports_failure() {
        struct Broken;
        impl Compiler for Broken {
            fn compile(&mut self, _: &BuildRequest<'_>) -> Result<(), CompileError> {
                Err(CompileError::Spawn {
                    program: "cc".into(),
                    source: std::io::Error::other("missing"),
                })
            }
        }
        assert!(!build_once(&mut Broken, &plan(Target::host(), false)));
    }
}
