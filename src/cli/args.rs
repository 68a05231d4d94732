//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::compiler::Target;

/// hotloop: live native dev loop with hot code reloading
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: hotloop.toml)
    #[arg(short = 'C', long, global = true, default_value = "hotloop.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build, load and run a module, reloading it on every change
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Entry source file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        entry: PathBuf,

        /// Arguments passed to the module (`argv[1..]`)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Rebuild on every change without loading the result
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,

        #[command(flatten)]
        target_args: TargetArgs,

        /// Entry source file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        entry: PathBuf,
    },

    /// Build once and exit
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,

        #[command(flatten)]
        target_args: TargetArgs,

        /// Entry source file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        entry: PathBuf,
    },

    /// Write compile_commands.json for the build settings, for clangd
    Lsp {
        #[command(flatten)]
        build_args: BuildArgs,

        #[command(flatten)]
        target_args: TargetArgs,

        /// Entry source file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        entry: PathBuf,
    },

    /// Print the include graph of one or more directories as Graphviz DOT
    #[command(visible_alias = "g")]
    Graph {
        /// Directories to read (default: the configured watch paths)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dirs: Vec<PathBuf>,

        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

/// Shared build arguments for every command that compiles
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build with optimizations
    #[arg(long)]
    pub release: bool,

    /// Directory for build artifacts (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,
}

/// What a standalone build produces. `run` always builds a module for
/// the host, so it has none of these.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Platform to compile for (default: this machine)
    #[arg(long, value_enum)]
    pub target: Option<Target>,

    /// Build a dynamic library (.so/.dylib/.dll) instead of an executable
    #[arg(long)]
    pub dynamic: bool,

    /// Output file (default: <output-dir>/<entry name>, relative to project root)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

impl Cli {
    /// Build arguments of the current command, if it builds anything.
    pub const fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Run { build_args, .. }
            | Commands::Watch { build_args, .. }
            | Commands::Build { build_args, .. }
            | Commands::Lsp { build_args, .. } => Some(build_args),
            Commands::Graph { .. } => None,
        }
    }

    /// Whether the command keeps rebuilding on change.
    pub const fn watches(&self) -> bool {
        matches!(self.command, Commands::Run { .. } | Commands::Watch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_module_args() {
        let cli = Cli::try_parse_from([
            "hotloop", "-v", "run", "--release", "src/main.c", "--level", "3",
        ])
        .unwrap();

        assert!(cli.verbose);
        match &cli.command {
            Commands::Run { build_args, entry, args } => {
                assert!(build_args.release);
                assert_eq!(entry, &PathBuf::from("src/main.c"));
                assert_eq!(args, &["--level", "3"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_watch_output_dir() {
        let cli = Cli::try_parse_from(["hotloop", "watch", "-o", "build", "main.c"]).unwrap();
        let build_args = cli.build_args().unwrap();
        assert_eq!(build_args.output_dir, Some(PathBuf::from("build")));
        assert!(!build_args.release);
        assert_eq!(cli.config, PathBuf::from("hotloop.toml"));
    }

    #[test]
    fn test_parse_graph() {
        let cli = Cli::try_parse_from(["hotloop", "graph", "src", "lib", "-o", "deps.dot"]).unwrap();
        assert!(cli.build_args().is_none());
        match cli.command {
            Commands::Graph { dirs, output } => {
                assert_eq!(dirs, [PathBuf::from("src"), PathBuf::from("lib")]);
                assert_eq!(output, Some(PathBuf::from("deps.dot")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_build_target() {
        let cli = Cli::try_parse_from([
            "hotloop", "build", "--target", "wasm", "--dynamic", "--out", "web/game.wasm", "main.c",
        ])
        .unwrap();
        assert!(!cli.watches());
        match cli.command {
            Commands::Build { target_args, entry, .. } => {
                assert_eq!(target_args.target, Some(Target::Wasm));
                assert!(target_args.dynamic);
                assert_eq!(target_args.out, Some(PathBuf::from("web/game.wasm")));
                assert_eq!(entry, PathBuf::from("main.c"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_target_names() {
        let cli = Cli::try_parse_from(["hotloop", "lsp", "--target", "macos", "main.c"]).unwrap();
        match cli.command {
            Commands::Lsp { target_args, .. } => assert_eq!(target_args.target, Some(Target::MacOs)),
            other => panic!("unexpected {other:?}"),
        }

        assert!(Cli::try_parse_from(["hotloop", "build", "--target", "amiga", "main.c"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["hotloop", "graph", "-C", "other.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
