//! Orchestrator
//!
//! The dev loop itself. One thread, one state, one tick at a time:
//!
//! ```text
//! poll watcher ──changed──▶ compile ──ok──▶ load + swap ──┐
//!      │                       │ err          │ err       │
//!      └───────────────────────┴──────────────┴──────▶ invoke ▶ sleep
//! ```
//!
//! A failed compile or load is reported and the last good module keeps
//! running. Watcher setup failures happen before the loop starts and are
//! fatal to the caller.
//!
//! Every build writes a fresh artifact, so the output directory holds at
//! most the active module plus the one being built.

mod output;


use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::arena::Arena;
use crate::compiler::{BuildRequest, Compiler, Target};
use crate::config::HotConfig;
use crate::hot::{Hot, HostState, Loader, SharedState};
use crate::logger::{error_chain, status_error, status_success};
use crate::watch::Watcher;

pub use output::OutputNamer;

/// What one module session runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub entry: PathBuf,
    /// Passed to the module as `argv[1..]`
    pub args: Vec<String>,
    pub output_dir: PathBuf,
    pub target: Target,
    pub release: bool,
    /// Initial `sleep_us`
    pub sleep: Duration,
}

impl RunOptions {
    pub fn from_config(config: &HotConfig, entry: PathBuf, args: Vec<String>) -> Self {
        Self {
            entry,
            args,
            output_dir: config.build.output_dir.clone(),
            target: Target::host(),
            release: config.build.release,
            sleep: config.run.sleep(),
        }
    }
}

/// Outcome of one [`Orchestrator::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// A rebuild was attempted
    pub changed: bool,
    /// A new module was swapped in
    pub swapped: bool,
    /// A module was called
    pub invoked: bool,
}

pub struct Orchestrator<C, L> {
    entry: PathBuf,
    output_dir: PathBuf,
    target: Target,
    release: bool,
    compiler: C,
    loader: L,
    watcher: Watcher,
    hot: Hot,
    host: HostState,
    names: OutputNamer,
    first_tick: bool,
}

impl<C: Compiler, L: Loader> Orchestrator<C, L> {
    /// `watcher` must already be registered on every source directory.
    pub fn new(options: RunOptions, compiler: C, loader: L, watcher: Watcher) -> Result<Self> {
        std::fs::create_dir_all(&options.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                options.output_dir.display()
            )
        })?;

        let argv: Vec<String> = std::iter::once(options.entry.display().to_string())
            .chain(options.args)
            .collect();
        let host = HostState::new(&argv, options.sleep, &crate::arena::ChunkCache::new());

        Ok(Self {
            names: OutputNamer::new(options.target),
            entry: options.entry,
            output_dir: options.output_dir,
            target: options.target,
            release: options.release,
            compiler,
            loader,
            watcher,
            hot: Hot::new(),
            host,
            first_tick: true,
        })
    }

    /// Run one iteration of the loop, without the trailing sleep.
    pub fn tick(&mut self) -> Tick {
        let scratch = Arena::new(self.host.chunk_cache());

        let changed = std::mem::take(&mut self.first_tick) || self.watcher.poll();
        let swapped = changed && self.rebuild(&scratch);

        self.host.advance_time();
        let invoked = self.hot.invoke(self.host.state_mut());

        scratch.destroy();
        Tick {
            changed,
            swapped,
            invoked,
        }
    }

    /// Tick until shutdown is requested, sleeping as long as the module asks.
    pub fn run(&mut self) {
        while !crate::core::is_shutdown() {
            self.tick();
            if crate::core::is_shutdown() {
                break;
            }
            std::thread::sleep(self.host.sleep());
        }
        crate::debug!("hot"; "stopped after {} reloads", self.hot.swaps());
    }

    /// Compile into a fresh artifact and swap it in. Returns `true` on swap.
    fn rebuild(&mut self, scratch: &Arena) -> bool {
        let name = scratch.alloc_str(&self.names.next_name());
        let output = self.output_dir.join(name);
        let request = BuildRequest {
            entry: &self.entry,
            output: &output,
            target: self.target,
            release: self.release,
            dynamic: true,
        };

        let started = Instant::now();
        if let Err(e) = self.compiler.compile(&request) {
            remove_artifact(&output);
            status_error(&format!("build failed: {}", self.entry.display()), &e.detail());
            return false;
        }

        let previous = self.hot.current().map(|module| module.path().to_path_buf());
        match self
            .hot
            .reload(&mut self.loader, &output, self.host.state_mut())
        {
            Ok(()) => {
                if let Some(previous) = previous {
                    remove_artifact(&previous);
                }
                status_success(&format!(
                    "reloaded {} in {}ms",
                    display_name(&self.entry),
                    started.elapsed().as_millis()
                ));
                true
            }
            Err(e) => {
                remove_artifact(&output);
                status_error("load failed, keeping the previous module", &error_chain(&e));
                false
            }
        }
    }

    pub fn hot(&self) -> &Hot {
        &self.hot
    }

    pub fn state(&self) -> &SharedState {
        self.host.state()
    }
}

/// Delete an artifact nothing will load again.
///
/// On unix a loaded module stays mapped after its file is unlinked. Where
/// the OS keeps loaded files locked the removal fails and the file stays.
fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => crate::debug!("hot"; "removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => crate::debug!("hot"; "kept {}: {}", path.display(), e),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
