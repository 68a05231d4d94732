//! Command-line interface module.

mod args;
pub mod build;
mod common;
pub mod graph;
pub mod lsp;
pub mod run;
pub mod watch;

pub use args::{BuildArgs, Cli, Commands, TargetArgs};
