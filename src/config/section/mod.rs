//! Configuration section definitions.
//!
//! Each module corresponds to a section in `hotloop.toml`:
//!
//! | Module  | TOML Section | Purpose                          |
//! |---------|--------------|----------------------------------|
//! | `watch` | `[watch]`    | Watched directories, debounce    |
//! | `build` | `[build]`    | Toolchain command, artifacts     |
//! | `run`   | `[run]`      | Run loop timing                  |

mod build;
mod run;
mod watch;

pub use build::BuildConfig;
pub use run::RunConfig;
pub use watch::WatchConfig;
