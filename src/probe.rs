//! Point-in-time memory sampling.
//!
//! A [`Probe`] reads the heap runtime's counters and the optional OS
//! resident-set-size oracle, producing one immutable [`MemorySnapshot`]
//! per call. Sampling has no side effect on program state, with one
//! documented exception: a probe constructed with
//! [`SampleMode::CollectFirst`] issues a collection-cycle request before
//! every read, a fixed per-scenario choice that keeps successive numbers
//! comparable in observation-only scenarios.

use crate::counters::Counters;
use crate::os;

/// The heap runtime collaborator: a statistics source plus the two
/// explicit reclamation requests. Both requests are synchronous,
/// always-succeeding, best-effort hints.
pub trait HeapRuntime {
    /// One atomic read of all heap counters.
    fn stats(&self) -> Counters;

    /// Request a collection cycle. Blocks until the sweep is complete.
    fn request_collection(&self);

    /// Request that free heap pages be returned to the OS.
    fn request_os_release(&self);
}

/// Whether a probe issues a collection-cycle request before each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Read the counters as they are.
    Raw,
    /// Collect, then read. Fixed per scenario, never implicit.
    CollectFirst,
}

/// A labeled point-in-time reading. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub label: &'static str,
    /// Live heap bytes.
    pub allocated_bytes: usize,
    /// Bytes committed for heap use, live or not.
    pub heap_in_use_bytes: usize,
    /// Bytes returned toward the OS, cumulative.
    pub heap_released_bytes: usize,
    /// Footprint high-water mark (reserved address space).
    pub system_reserved_bytes: usize,
    /// OS resident-set-size, or 0 where the oracle is unsupported.
    pub resident_set_size_bytes: usize,
}

/// Samples a [`HeapRuntime`] and the resident-set-size oracle.
pub struct Probe<'h, H: HeapRuntime> {
    heap: &'h H,
    mode: SampleMode,
    oracle: fn() -> Option<usize>,
}

impl<'h, H: HeapRuntime> Probe<'h, H> {
    /// A probe over `heap` using the platform resident-set-size oracle.
    pub fn new(heap: &'h H, mode: SampleMode) -> Self {
        Self { heap, mode, oracle: os::resident_set_size }
    }

    /// A probe with a caller-supplied resident-set-size oracle.
    pub fn with_oracle(heap: &'h H, mode: SampleMode, oracle: fn() -> Option<usize>) -> Self {
        Self { heap, mode, oracle }
    }

    /// The heap runtime this probe reads.
    pub fn heap(&self) -> &'h H {
        self.heap
    }

    /// Take one labeled sample. An unavailable oracle yields the 0
    /// sentinel, never an error.
    pub fn sample(&self, label: &'static str) -> MemorySnapshot {
        if self.mode == SampleMode::CollectFirst {
            self.heap.request_collection();
        }

        let counters = self.heap.stats();

        MemorySnapshot {
            label,
            allocated_bytes: counters.allocated_bytes,
            heap_in_use_bytes: counters.heap_in_use(),
            heap_released_bytes: counters.released_bytes,
            system_reserved_bytes: counters.reserved_bytes,
            resident_set_size_bytes: (self.oracle)().unwrap_or(0),
        }
    }
}
