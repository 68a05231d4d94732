//! Chunked bump allocator.
//!
//! An [`Arena`] serves variable-size allocations out of 1 MiB chunks taken
//! from a shared [`ChunkCache`]. There is no per-allocation free: the whole
//! arena is released at once, which returns its chunks to the cache.
//!
//! Two lifetimes are in use:
//! - long-lived arenas, such as the one holding include graph names
//! - a temporary arena created and destroyed every dev loop tick
//!
//! # Example
//!
//! ```ignore
//! let cache = ChunkCache::new();
//! let tmp = Arena::new(&cache);
//! let name = tmp.alloc_str("out/hot-1.so");
//! tmp.destroy(); // chunks go back to `cache`
//! ```

mod chunk;

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

pub use chunk::{ALIGN, CHUNK_SIZE, CacheStats, Chunk, ChunkCache};

/// Round `n` up to the next multiple of [`ALIGN`].
#[inline]
const fn align_up(n: usize) -> usize {
    (n + ALIGN - 1) & !(ALIGN - 1)
}

/// A stack allocator for variable size allocations.
///
/// Each allocation must fit in a single chunk.
pub struct Arena {
    cache: ChunkCache,
    /// Used chunks; the last entry is the head that serves new allocations.
    chunks: RefCell<Vec<Chunk>>,
    /// Bytes used in the head chunk, always a multiple of [`ALIGN`].
    used: Cell<usize>,
}

impl Arena {
    /// Create an empty arena. The first allocation takes a chunk from `cache`.
    pub fn new(cache: &ChunkCache) -> Self {
        Self {
            cache: cache.clone(),
            chunks: RefCell::new(Vec::new()),
            used: Cell::new(0),
        }
    }

    /// Allocate `size` bytes of uninitialized, 16-byte aligned memory.
    ///
    /// The memory stays valid until the arena is destroyed.
    ///
    /// # Panics
    ///
    /// Panics if `size` is larger than [`CHUNK_SIZE`].
    pub fn alloc(&self, size: usize) -> NonNull<u8> {
        assert!(
            size <= CHUNK_SIZE,
            "allocation of {size} bytes exceeds the chunk capacity of {CHUNK_SIZE} bytes"
        );

        let mut chunks = self.chunks.borrow_mut();
        let mut used = self.used.get();

        let head = match chunks.last() {
            Some(chunk) if used + size <= CHUNK_SIZE => chunk.base(),
            _ => {
                // Head is full (or missing), the previous head stays in the list
                let chunk = self.cache.pop();
                let base = chunk.base();
                chunks.push(chunk);
                used = 0;
                base
            }
        };

        // SAFETY: `used + size <= CHUNK_SIZE`, so the range lies inside the head chunk.
        let ptr = unsafe { head.add(used) };
        self.used.set(align_up(used + size));
        ptr
    }

    /// Allocate `size` zeroed bytes.
    #[cfg(test)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_zeroed(&self, size: usize) -> &mut [u8] {
        let ptr = self.alloc(size);
        // SAFETY: the range is freshly allocated and exclusively ours until
        // the arena is destroyed, which requires `self` by value.
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), 0, size);
            std::slice::from_raw_parts_mut(ptr.as_ptr(), size)
        }
    }

    /// Copy a string into the arena.
    pub fn alloc_str(&self, s: &str) -> &str {
        let bytes = self.alloc_slice_copy(s.as_bytes());
        // SAFETY: the bytes were copied from a valid `str`.
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }

    /// Copy a slice of plain values into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, items: &[T]) -> &mut [T] {
        assert!(std::mem::align_of::<T>() <= ALIGN);
        let ptr = self.alloc(std::mem::size_of_val(items)).cast::<T>();
        // SAFETY: the destination is aligned for `T`, large enough, and
        // does not overlap `items`.
        unsafe {
            std::ptr::copy_nonoverlapping(items.as_ptr(), ptr.as_ptr(), items.len());
            std::slice::from_raw_parts_mut(ptr.as_ptr(), items.len())
        }
    }

    /// Number of chunks owned by this arena.
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Bytes used in the head chunk.
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Free this arena and all its allocations.
    ///
    /// Equivalent to dropping it; spelled out where the release point matters.
    pub fn destroy(self) {}
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.cache.push_all(self.chunks.get_mut().drain(..));
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("chunks", &self.chunk_count())
            .field("used", &self.used())
            .finish()
    }
}
