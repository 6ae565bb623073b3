//! [`Meter`] wraps an allocator and accounts every allocation against
//! [`Counters`], behind a `lock_api` mutex.
//!
//! Installed as the global allocator, it stands in for a managed runtime's
//! memory-statistics source: [`Meter::counters`] is the single atomic read
//! of all counters, [`Meter::collect`] is the explicit collection-cycle
//! request and [`Meter::release_to_os`] the explicit OS-release request.
//! Both requests are synchronous, best-effort hints; callers may only rely
//! on the effect being visible to the next counter read.

use core::alloc::{GlobalAlloc, Layout};

use crate::counters::Counters;
use crate::os;

/// A mutex-locked counter set over an inner allocator.
///
/// # Example
/// ```rust
/// use std::alloc::System;
/// use reclaim::SpinMeter;
///
/// #[global_allocator]
/// static METER: SpinMeter = SpinMeter::new(System);
///
/// let snapshot = METER.counters();
/// assert!(snapshot.allocated_bytes <= snapshot.reserved_bytes);
/// ```
#[derive(Debug)]
pub struct Meter<R: lock_api::RawMutex, A: GlobalAlloc> {
    counters: lock_api::Mutex<R, Counters>,
    allocator: A,
}

/// [`Meter`] over the system allocator, spin-locked. Suitable for
/// `#[global_allocator]` statics.
pub type SpinMeter<A = std::alloc::System> = Meter<spin::Mutex<()>, A>;

impl<R: lock_api::RawMutex, A: GlobalAlloc> Meter<R, A> {
    pub const fn new(allocator: A) -> Self {
        Self { counters: lock_api::Mutex::new(Counters::new()), allocator }
    }

    /// Read all counters in one locked copy.
    pub fn counters(&self) -> Counters {
        *self.counters.lock()
    }

    /// Issue a collection-cycle request: pending frees stop counting
    /// toward the in-use heap. Returns the number of bytes swept.
    pub fn collect(&self) -> usize {
        self.counters.lock().account_collect()
    }

    /// Issue an OS-release request: swept bytes are accounted as released
    /// and, where the platform supports it, free heap pages are genuinely
    /// returned. Returns the number of bytes accounted.
    pub fn release_to_os(&self) -> usize {
        let released = self.counters.lock().account_release();
        os::trim_heap();
        released
    }
}

unsafe impl<R: lock_api::RawMutex, A: GlobalAlloc> GlobalAlloc for Meter<R, A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.allocator.alloc(layout);
        if !ptr.is_null() {
            self.counters.lock().account_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.allocator.alloc_zeroed(layout);
        if !ptr.is_null() {
            self.counters.lock().account_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.counters.lock().account_dealloc(layout.size());
        self.allocator.dealloc(ptr, layout);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.allocator.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let mut counters = self.counters.lock();
            counters.account_dealloc(layout.size());
            counters.account_alloc(new_size);
        }
        new_ptr
    }
}

impl<R: lock_api::RawMutex, A: GlobalAlloc> crate::probe::HeapRuntime for Meter<R, A> {
    fn stats(&self) -> Counters {
        self.counters()
    }

    fn request_collection(&self) {
        self.collect();
    }

    fn request_os_release(&self) {
        self.release_to_os();
    }
}
