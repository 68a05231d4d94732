//! hotloop - a live native dev loop with hot code reloading.

mod arena;
mod cli;
mod compiler;
mod config;
mod core;
mod graph;
mod hot;
mod logger;
mod orchestrator;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::HotConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = HotConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    match &cli.command {
        Commands::Run { entry, args, .. } => cli::run::run_module(&config, entry, args),
        Commands::Watch {
            entry, target_args, ..
        } => cli::watch::watch_build(&config, entry, target_args),
        Commands::Build {
            entry, target_args, ..
        } => cli::build::build_entry(&config, entry, target_args),
        Commands::Lsp {
            entry, target_args, ..
        } => cli::lsp::write_compile_commands(&config, entry, target_args).map(|_| ()),
        Commands::Graph { dirs, output } => {
            cli::graph::print_graph(&config, dirs, output.as_deref())
        }
    }
}
