//! Compiler collaborator.
//!
//! The dev loop only needs "turn this entry source into that artifact, or
//! tell me why not". [`Compiler`] is that contract; [`CommandCompiler`] is
//! the default implementation running a C toolchain from the config.

mod command;

use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;

pub use command::CommandCompiler;

/// Target platform of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    Linux,
    #[value(name = "macos")]
    MacOs,
    Windows,
    Wasm,
}

impl Target {
    /// The platform this binary runs on.
    pub const fn host() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// File extension of a dynamically loadable module.
    pub const fn module_ext(self) -> &'static str {
        match self {
            Self::Linux => "so",
            Self::MacOs => "dylib",
            Self::Windows => "dll",
            Self::Wasm => "wasm",
        }
    }

    /// File name of the artifact built from an entry named `stem`.
    pub fn artifact_name(self, stem: &str, dynamic: bool) -> String {
        match self {
            Self::Wasm => format!("{stem}.wasm"),
            _ if dynamic => format!("{stem}.{}", self.module_ext()),
            Self::Windows => format!("{stem}.exe"),
            Self::Linux | Self::MacOs => stem.to_string(),
        }
    }
}

/// One compile invocation.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub entry: &'a Path,
    pub output: &'a Path,
    pub target: Target,
    pub release: bool,
    /// Produce a loadable module instead of an executable
    pub dynamic: bool,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed with {status}")]
    Failed {
        program: String,
        status: ExitStatus,
        diagnostics: String,
    },
}

impl CompileError {
    /// Human readable compiler output, empty if there is none.
    pub fn diagnostics(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { diagnostics, .. } => diagnostics,
        }
    }

    /// Text for the status block: the compiler's own output when it
    /// printed any, otherwise the error and its causes.
    pub fn detail(&self) -> String {
        match self.diagnostics() {
            "" => crate::logger::error_chain(self),
            diagnostics => diagnostics.to_string(),
        }
    }
}

pub trait Compiler {
    fn compile(&mut self, request: &BuildRequest<'_>) -> Result<(), CompileError>;
}
