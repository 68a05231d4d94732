//! Utility modules shared by the CLI commands.

pub mod exec;
pub mod path;
