//! Compiler backed by an external C toolchain command.

use std::path::PathBuf;

use super::{BuildRequest, CompileError, Compiler, Target};
use crate::debug;
use crate::utils::exec::{Cmd, FilterRule};

/// Diagnostic lines that only add context to a preceding error.
const DIAGNOSTIC_FILTER: FilterRule = FilterRule::new(&["In file included from", "note:"]);

/// Runs `program [args...] [flags...] <mode> -o <output> <entry>`.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: Vec<String>,
    flags: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandCompiler {
    /// `command` is the program followed by any leading arguments
    /// (e.g. `["zig", "cc"]`).
    pub fn new(command: Vec<String>, flags: Vec<String>) -> Self {
        Self {
            command,
            flags,
            cwd: None,
        }
    }

    /// Run the toolchain from `dir`.
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Program and arguments that would build `request`.
    pub fn command_line(&self, request: &BuildRequest<'_>) -> Vec<String> {
        self.command_for(request).argv()
    }

    /// Assemble the command line for `request`.
    fn command_for(&self, request: &BuildRequest<'_>) -> Cmd {
        let mode: &[&str] = if request.release {
            &["-O2", "-DNDEBUG"]
        } else {
            &["-O0", "-g"]
        };

        let mut cmd = Cmd::from_slice(self.command.as_slice())
            .args(&self.flags)
            .args(mode)
            .args(target_flags(request.target));

        if request.dynamic {
            cmd = match request.target {
                Target::Wasm => cmd.arg("-Wl,--no-entry").arg("-Wl,--export-dynamic"),
                Target::Windows => cmd.arg("-shared"),
                Target::Linux | Target::MacOs => cmd.args(["-shared", "-fPIC"]),
            };
        }

        cmd = cmd.arg("-o").arg(request.output).arg(request.entry);
        match &self.cwd {
            Some(dir) => cmd.cwd(dir),
            None => cmd,
        }
    }
}

fn target_flags(target: Target) -> &'static [&'static str] {
    match target {
        Target::Wasm => &["--target=wasm32", "-nostdlib"],
        _ if target == Target::host() => &[],
        Target::Linux => &["--target=x86_64-linux-gnu"],
        Target::MacOs => &["--target=x86_64-apple-darwin"],
        Target::Windows => &["--target=x86_64-windows-gnu"],
    }
}

impl Compiler for CommandCompiler {
    fn compile(&mut self, request: &BuildRequest<'_>) -> Result<(), CompileError> {
        let cmd = self.command_for(request);
        let program = cmd.program_name();
        debug!("build"; "{}", cmd.display());

        let output = cmd.output().map_err(|source| CompileError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            // Warnings from a successful build
            DIAGNOSTIC_FILTER.log("build", &stderr);
            return Ok(());
        }

        let mut diagnostics = DIAGNOSTIC_FILTER.apply(&stderr);
        if diagnostics.is_empty() {
            diagnostics = DIAGNOSTIC_FILTER.apply(&String::from_utf8_lossy(&output.stdout));
        }

        Err(CompileError::Failed {
            program,
            status: output.status,
            diagnostics: diagnostics.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn request<'a>(entry: &'a Path, output: &'a Path) -> BuildRequest<'a> {
        BuildRequest {
            entry,
            output,
            target: Target::host(),
            release: false,
            dynamic: true,
        }
    }

    #[test]
    fn test_command_line_debug_dynamic() {
        let compiler = CommandCompiler::new(vec!["zig".into(), "cc".into()], vec!["-Wall".into()]);
        let cmd = compiler.command_for(&request(Path::new("src/main.c"), Path::new("out/hot.so")));
        let line = cmd.display();

        assert!(line.starts_with("zig cc -Wall -O0 -g"));
        assert!(line.contains("-shared"));
        assert!(line.ends_with("-o out/hot.so src/main.c"));
    }

    #[test]
    fn test_command_line_release_static() {
        let compiler = CommandCompiler::new(vec!["clang".into()], vec![]);
        let mut req = request(Path::new("main.c"), Path::new("main"));
        req.release = true;
        req.dynamic = false;
        let line = compiler.command_for(&req).display();

        assert_eq!(line, "clang -O2 -DNDEBUG -o main main.c");
    }

    #[test]
    fn test_wasm_target_flags() {
        let compiler = CommandCompiler::new(vec!["clang".into()], vec![]);
        let mut req = request(Path::new("main.c"), Path::new("main.wasm"));
        req.target = Target::Wasm;
        let line = compiler.command_for(&req).display();

        assert!(line.contains("--target=wasm32"));
        assert!(line.contains("-Wl,--no-entry"));
        assert!(!line.contains("-fPIC"));
    }

    #[test]
    fn test_cross_target_flags() {
        let compiler = CommandCompiler::new(vec!["clang".into()], vec![]);
        let mut req = request(Path::new("main.c"), Path::new("main.dll"));
        req.target = if Target::host() == Target::Windows {
            Target::Linux
        } else {
            Target::Windows
        };
        let line = compiler.command_line(&req);

        assert!(line.iter().any(|arg| arg.starts_with("--target=x86_64-")));
        assert!(line.contains(&"-shared".to_string()));
        assert_eq!(line.last().map(String::as_str), Some("main.c"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut compiler = CommandCompiler::new(vec!["hotloop-no-such-cc".into()], vec![]);
        let err = compiler
            .compile(&request(Path::new("main.c"), Path::new("hot.so")))
            .unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }));
        assert_eq!(err.diagnostics(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_captures_diagnostics() {
        let script = "echo 'main.c:1:1: error: boom' >&2; echo 'note: here' >&2; exit 1";
        let mut compiler = CommandCompiler::new(vec!["sh".into(), "-c".into(), script.into()], vec![]);
        let err = compiler
            .compile(&request(Path::new("main.c"), Path::new("hot.so")))
            .unwrap_err();

        match err {
            CompileError::Failed { program, diagnostics, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(diagnostics, "main.c:1:1: error: boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success() {
        let mut compiler = CommandCompiler::new(vec!["sh".into(), "-c".into(), "exit 0".into()], vec![]);
        compiler
            .compile(&request(Path::new("main.c"), Path::new("hot.so")))
            .unwrap();
    }
}
