//! Reclamation-phase counters for the metered heap.
//!
//! The counters model the phases a garbage-collected heap moves memory
//! through, on top of a runtime that actually frees eagerly:
//!
//! - `allocated_bytes`: live allocations. Exact at all times.
//! - `freed_bytes`: deallocated since the last collection request, still
//!   counted against the in-use heap.
//! - `retained_bytes`: swept by a collection request, pages still resident.
//! - `released_bytes`: returned toward the OS (cumulative).
//! - `reserved_bytes`: footprint high-water mark, monotone. Address space
//!   is reserved, never handed back.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Counters {
    /// Number of active allocations.
    pub allocation_count: usize,
    /// Total number of allocations. Reallocations recounted.
    pub total_allocation_count: u64,

    /// Sum of active allocations' layouts' size.
    pub allocated_bytes: usize,
    /// Bytes deallocated since the last collection request.
    pub freed_bytes: usize,
    /// Bytes swept by a collection request but not yet released.
    pub retained_bytes: usize,
    /// Bytes released toward the OS. Cumulative.
    pub released_bytes: usize,
    /// High-water mark of the heap footprint.
    pub reserved_bytes: usize,
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            allocation_count: 0,
            total_allocation_count: 0,
            allocated_bytes: 0,
            freed_bytes: 0,
            retained_bytes: 0,
            released_bytes: 0,
            reserved_bytes: 0,
        }
    }

    /// Bytes committed for heap use: live allocations plus frees that no
    /// collection request has swept yet.
    pub const fn heap_in_use(&self) -> usize {
        self.allocated_bytes + self.freed_bytes
    }

    /// Bytes of heap the process currently holds, swept or not.
    pub const fn footprint(&self) -> usize {
        self.allocated_bytes + self.freed_bytes + self.retained_bytes
    }

    pub(crate) fn account_alloc(&mut self, size: usize) {
        self.allocation_count += 1;
        self.total_allocation_count += 1;

        // Free heap is reused before the footprint grows, unswept pages
        // ahead of swept ones.
        let from_freed = size.min(self.freed_bytes);
        self.freed_bytes -= from_freed;
        let from_retained = (size - from_freed).min(self.retained_bytes);
        self.retained_bytes -= from_retained;

        self.allocated_bytes += size;

        if self.footprint() > self.reserved_bytes {
            self.reserved_bytes = self.footprint();
        }
    }

    pub(crate) fn account_dealloc(&mut self, size: usize) {
        self.allocation_count -= 1;
        self.allocated_bytes -= size;
        self.freed_bytes += size;
    }

    /// Collection-cycle request: sweep pending frees. Returns bytes swept.
    pub(crate) fn account_collect(&mut self) -> usize {
        let swept = self.freed_bytes;
        self.freed_bytes = 0;
        self.retained_bytes += swept;
        swept
    }

    /// OS-release request: hand swept pages back. Returns bytes released.
    pub(crate) fn account_release(&mut self) -> usize {
        let released = self.retained_bytes;
        self.retained_bytes = 0;
        self.released_bytes += released;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_dealloc_collect_release() {
        let mut c = Counters::new();

        c.account_alloc(1000);
        c.account_alloc(24);
        assert!(c.allocation_count == 2);
        assert!(c.total_allocation_count == 2);
        assert!(c.allocated_bytes == 1024);
        assert!(c.heap_in_use() == 1024);
        assert!(c.reserved_bytes == 1024);
        assert!(c.released_bytes == 0);

        c.account_dealloc(1000);
        assert!(c.allocation_count == 1);
        assert!(c.allocated_bytes == 24);
        assert!(c.freed_bytes == 1000);
        // frees stay committed until a collection request
        assert!(c.heap_in_use() == 1024);
        assert!(c.footprint() == 1024);

        let swept = c.account_collect();
        assert!(swept == 1000);
        assert!(c.freed_bytes == 0);
        assert!(c.retained_bytes == 1000);
        assert!(c.heap_in_use() == 24);
        // swept pages are still resident
        assert!(c.footprint() == 1024);
        assert!(c.reserved_bytes == 1024);

        let released = c.account_release();
        assert!(released == 1000);
        assert!(c.retained_bytes == 0);
        assert!(c.released_bytes == 1000);
        assert!(c.footprint() == 24);
        // reserved address space is never handed back
        assert!(c.reserved_bytes == 1024);
    }

    #[test]
    fn test_alloc_reuses_free_heap() {
        let mut c = Counters::new();

        c.account_alloc(4096);
        c.account_dealloc(4096);
        c.account_collect();
        assert!(c.retained_bytes == 4096);
        assert!(c.reserved_bytes == 4096);

        // entirely served from the retained pool
        c.account_alloc(1024);
        assert!(c.retained_bytes == 3072);
        assert!(c.allocated_bytes == 1024);
        assert!(c.footprint() == 4096);
        assert!(c.reserved_bytes == 4096);

        c.account_dealloc(1024);
        // split across pending frees and the retained pool
        c.account_alloc(2048);
        assert!(c.freed_bytes == 0);
        assert!(c.retained_bytes == 2048);
        assert!(c.footprint() == 4096);
        assert!(c.reserved_bytes == 4096);

        // only growth past the free pools moves the high-water mark
        c.account_alloc(8192);
        assert!(c.retained_bytes == 0);
        assert!(c.reserved_bytes == 2048 + 8192);
    }

    #[test]
    fn test_collect_without_frees_is_inert() {
        let mut c = Counters::new();
        c.account_alloc(512);

        assert!(c.account_collect() == 0);
        assert!(c.account_release() == 0);
        assert!(c.heap_in_use() == 512);
        assert!(c.released_bytes == 0);
    }
}
