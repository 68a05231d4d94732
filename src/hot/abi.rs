//! The boundary between the host and a loaded module.
//!
//! A module is a shared library exporting exactly two symbols:
//!
//! ```c
//! const uint32_t hotloop_abi_version = 1;
//! void hotloop_entry(SharedState *state);
//! ```
//!
//! The version is checked before the entry point is resolved; a module built
//! against another layout of [`SharedState`] is rejected instead of called.

use std::ffi::{c_char, c_void};

/// Layout version of [`SharedState`]. Bump on every field change.
pub const ABI_VERSION: u32 = 1;

/// Exported `u32` holding the module's [`ABI_VERSION`].
pub const VERSION_SYMBOL: &str = "hotloop_abi_version";

/// Exported entry point, called once per tick.
pub const ENTRY_SYMBOL: &str = "hotloop_entry";

/// Signature of [`ENTRY_SYMBOL`].
pub type EntryFn = unsafe extern "C" fn(state: *mut SharedState);

/// Host callback writing `len` bytes at `data` to the host's stdout.
pub type WriteFn = unsafe extern "C" fn(data: *const u8, len: usize);

/// State shared by the host and the active module.
///
/// The block is allocated once and never moves, so pointers the module
/// keeps into it (or hangs off `app`) survive a reload. Only the host writes
/// `reloaded`; everything else belongs to the module once it runs.
#[repr(C)]
#[derive(Debug)]
pub struct SharedState {
    pub abi_version: u32,
    /// True for exactly one call after a new module was swapped in
    pub reloaded: bool,
    pub argc: u32,
    pub argv: *const *const c_char,
    /// Nanoseconds since the host started
    pub time_ns: u64,
    /// Seconds since the previous tick
    pub dt: f32,
    /// Requested delay before the next tick, in microseconds
    pub sleep_us: u64,
    pub rand_seed: u64,
    pub write: WriteFn,
    /// Host chunk cache, opaque to modules not linked against this crate
    pub chunk_cache: *mut c_void,
    /// Module owned state, null until the module sets it
    pub app: *mut c_void,
}
