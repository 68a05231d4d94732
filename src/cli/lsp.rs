//! `hotloop lsp`: write a `compile_commands.json` for clangd.
//!
//! The single entry mirrors exactly what `hotloop build` would run, so the
//! editor sees the same flags, target and defines as the toolchain.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::TargetArgs;
use super::common::{BuildPlan, command_compiler};
use crate::compiler::CommandCompiler;
use crate::config::HotConfig;
use crate::log;

const COMPILE_COMMANDS: &str = "compile_commands.json";

/// One entry of the JSON compilation database.
#[derive(Debug, Serialize)]
struct CompileCommand {
    directory: String,
    arguments: Vec<String>,
    file: String,
    output: String,
}

pub fn write_compile_commands(
    config: &HotConfig,
    entry: &Path,
    target: &TargetArgs,
) -> Result<PathBuf> {
    let plan = BuildPlan::new(config, entry, target)?;
    let compiler = command_compiler(config)?;

    let path = config.get_root().join(COMPILE_COMMANDS);
    let json = render(config.get_root(), &compiler, &plan)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    log!("lsp"; "wrote {}", path.display());
    Ok(path)
}

fn render(root: &Path, compiler: &CommandCompiler, plan: &BuildPlan) -> Result<String> {
    let commands = [CompileCommand {
        directory: root.display().to_string(),
        arguments: compiler.command_line(&plan.request()),
        file: plan.entry.display().to_string(),
        output: plan.output.display().to_string(),
    }];
    Ok(serde_json::to_string_pretty(&commands)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Target;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_render_matches_build_command() {
        let compiler = CommandCompiler::new(vec!["clang".into()], vec!["-Isrc".into()]);
        let plan = BuildPlan {
            entry: PathBuf::from("/proj/src/main.c"),
            output: PathBuf::from("/proj/out/main.wasm"),
            target: Target::Wasm,
            release: false,
            dynamic: true,
        };

        let json = render(Path::new("/proj"), &compiler, &plan).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &value[0];

        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(entry["directory"], "/proj");
        assert_eq!(entry["file"], "/proj/src/main.c");
        assert_eq!(entry["output"], "/proj/out/main.wasm");

        let arguments: Vec<&str> = entry["arguments"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a.as_str())
            .collect();
        assert_eq!(arguments[..2], ["clang", "-Isrc"]);
        assert!(arguments.contains(&"--target=wasm32"));
        assert_eq!(arguments.last(), Some(&"/proj/src/main.c"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_compile_commands() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.c"), "").unwrap();
        let mut config = test_parse_config("[build]\ncompiler = [\"sh\"]");
        config.root = dir.path().to_path_buf();

        let path =
            write_compile_commands(&config, Path::new("main.c"), &TargetArgs::default()).unwrap();
        assert_eq!(path, dir.path().join(COMPILE_COMMANDS));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["arguments"][0], "sh");
    }
}
