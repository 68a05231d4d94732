//! Fixed-size chunks and the process-wide chunk cache.
//!
//! Memory is requested from the global allocator in 1 MiB chunks and never
//! handed back while the cache is alive. Every chunk is interchangeable, so a
//! chunk released by one arena can be reused by any other.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

/// Every chunk has a fixed size of exactly 1 MiB.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Alignment of every chunk and of every arena allocation.
pub const ALIGN: usize = 16;

/// 16-byte unit used to get aligned chunk memory without a custom layout.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct Block([u8; ALIGN]);

/// One block of raw memory, owned by exactly one arena or by the cache.
///
/// The memory is held through a raw pointer so arena allocations can hand
/// out disjoint references into it while the chunk itself is moved around.
pub struct Chunk {
    base: NonNull<Block>,
}

impl Chunk {
    /// Ask the global allocator for a fresh chunk.
    fn from_os() -> Self {
        let blocks = vec![Block([0; ALIGN]); CHUNK_SIZE / ALIGN].into_boxed_slice();
        let raw = Box::into_raw(blocks);
        // SAFETY: Box::into_raw never returns null.
        let base = unsafe { NonNull::new_unchecked(raw.cast::<Block>()) };
        Self { base }
    }

    /// Start address of the chunk.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.base.cast()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        let slice = std::ptr::slice_from_raw_parts_mut(self.base.as_ptr(), CHUNK_SIZE / ALIGN);
        // SAFETY: `base` came from `Box::into_raw` of exactly this slice shape.
        drop(unsafe { Box::from_raw(slice) });
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Chunk").field(&self.base).finish()
    }
}

/// Allocation statistics of a [`ChunkCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Chunks ever requested from the global allocator.
    pub allocated: usize,
    /// Chunks currently sitting in the free list.
    pub cached: usize,
}

#[derive(Default)]
struct CacheInner {
    free: Vec<Chunk>,
    allocated: usize,
}

/// Free list of chunks, shared by every arena of one thread.
///
/// Cloning the handle is cheap; all clones refer to the same free list.
/// The free list is a LIFO stack: the most recently released chunk is the
/// first one handed out again.
#[derive(Clone, Default)]
pub struct ChunkCache {
    inner: Rc<RefCell<CacheInner>>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a chunk from the free list, or from the OS when it is empty.
    pub fn pop(&self) -> Chunk {
        let mut inner = self.inner.borrow_mut();
        if let Some(chunk) = inner.free.pop() {
            return chunk;
        }
        inner.allocated += 1;
        Chunk::from_os()
    }

    /// Return chunks to the free list.
    ///
    /// Chunks are pushed in order, so the last chunk of `chunks` is the next
    /// one to be popped.
    pub fn push_all(&self, chunks: impl IntoIterator<Item = Chunk>) {
        self.inner.borrow_mut().free.extend(chunks);
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.borrow();
        CacheStats {
            allocated: inner.allocated,
            cached: inner.free.len(),
        }
    }
}

impl std::fmt::Debug for ChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkCache").field("stats", &self.stats()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_is_aligned() {
        let cache = ChunkCache::new();
        let chunk = cache.pop();
        assert_eq!(chunk.base().as_ptr() as usize % ALIGN, 0);
    }

    #[test]
    fn test_cache_is_lifo() {
        let cache = ChunkCache::new();
        let a = cache.pop();
        let b = cache.pop();
        let (a_ptr, b_ptr) = (a.base(), b.base());

        cache.push_all([a, b]);
        assert_eq!(cache.pop().base(), b_ptr);
        assert_eq!(cache.pop().base(), a_ptr);
    }

    #[test]
    fn test_stats() {
        let cache = ChunkCache::new();
        let chunk = cache.pop();
        assert_eq!(cache.stats(), CacheStats { allocated: 1, cached: 0 });

        cache.push_all([chunk]);
        assert_eq!(cache.stats(), CacheStats { allocated: 1, cached: 1 });

        let _again = cache.pop();
        assert_eq!(cache.stats(), CacheStats { allocated: 1, cached: 0 });
    }
}
