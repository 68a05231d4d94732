//! Host-side ownership of the [`SharedState`] block.

use std::ffi::{CString, c_char, c_void};
use std::io::Write;
use std::time::{Duration, Instant, SystemTime};

use super::abi::{ABI_VERSION, SharedState};
use crate::arena::ChunkCache;

/// Owns the shared block and everything its raw pointers point into.
///
/// The block is boxed so its address stays fixed for the life of the host,
/// whatever module is currently operating on it.
pub struct HostState {
    state: Box<SharedState>,
    /// Backing storage of `argv`
    _args: Vec<CString>,
    _argv: Vec<*const c_char>,
    cache: Box<ChunkCache>,
    start: Instant,
    last_tick: Instant,
}

impl HostState {
    /// `args[0]` is the module's own name, like a process `argv`.
    pub fn new(args: &[String], sleep: Duration, cache: &ChunkCache) -> Self {
        let args: Vec<CString> = args
            .iter()
            .map(|arg| CString::new(arg.as_str()).unwrap_or_default())
            .collect();
        let mut argv: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        argv.push(std::ptr::null());

        let mut cache = Box::new(cache.clone());
        let now = Instant::now();

        let state = Box::new(SharedState {
            abi_version: ABI_VERSION,
            reloaded: false,
            argc: args.len() as u32,
            argv: argv.as_ptr(),
            time_ns: 0,
            dt: 0.0,
            sleep_us: sleep.as_micros() as u64,
            rand_seed: seed(),
            write: host_write,
            chunk_cache: (&mut *cache as *mut ChunkCache).cast::<c_void>(),
            app: std::ptr::null_mut(),
        });

        Self {
            state,
            _args: args,
            _argv: argv,
            cache,
            start: now,
            last_tick: now,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SharedState {
        &mut self.state
    }

    pub fn chunk_cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Update the clock fields before a module call.
    pub fn advance_time(&mut self) {
        let now = Instant::now();
        self.state.time_ns = now.duration_since(self.start).as_nanos() as u64;
        self.state.dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
    }

    /// Delay requested by the module for the next tick.
    pub fn sleep(&self) -> Duration {
        Duration::from_micros(self.state.sleep_us)
    }
}

/// Seed for the module's RNG, different on every start.
fn seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ (u64::from(std::process::id()) << 32)
}

/// [`super::abi::WriteFn`] handed to modules.
unsafe extern "C" fn host_write(data: *const u8, len: usize) {
    if data.is_null() || len == 0 {
        return;
    }
    // SAFETY: the module promises `data` points to `len` readable bytes.
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).ok();
    stdout.flush().ok();
    crate::logger::note_output();
}
