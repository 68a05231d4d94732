//! `hotloop run`: build, load and call a module, reloading on change.

use std::path::Path;

use anyhow::Result;

use super::common::{command_compiler, resolve_entry, start_watcher};
use crate::config::HotConfig;
use crate::hot::DylibLoader;
use crate::log;
use crate::orchestrator::{Orchestrator, RunOptions};

pub fn run_module(config: &HotConfig, entry: &Path, args: &[String]) -> Result<()> {
    let entry = resolve_entry(config, entry)?;
    let compiler = command_compiler(config)?;
    let watcher = start_watcher(config)?;

    let options = RunOptions::from_config(config, entry, args.to_vec());
    log!("hot"; "running {} (ctrl+c to stop)", options.entry.display());

    let mut orchestrator = Orchestrator::new(options, compiler, DylibLoader::new(), watcher)?;
    orchestrator.run();
    Ok(())
}
