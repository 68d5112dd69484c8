use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::alloc::AllocPolicy;

/// An allocator which serves a fixed number of requests (allocations and reallocations) from the
/// [`System`] allocator and reports exhaustion for every request after that. It keeps count of the
/// blocks which are currently live, so that tests can check that nothing is leaked on a failure
/// path.
///
/// It can also refuse a number of requests up front before serving any, to drive retries.
#[derive(Debug)]
pub struct LimitedAlloc {
    failing: AtomicUsize,
    remaining: AtomicUsize,
    live: AtomicUsize,
    reallocs: AtomicUsize,
    refused: AtomicUsize,
}

impl LimitedAlloc {
    /// Creates a new allocator serving `allowed` requests. It is leaked, because a policy can only
    /// refer to an allocator with a static lifetime.
    pub fn leak(allowed: usize) -> &'static LimitedAlloc {
        LimitedAlloc::leak_flaky(0, allowed)
    }

    /// Creates a new allocator which refuses its first `failures` requests, then serves `allowed`.
    pub fn leak_flaky(failures: usize, allowed: usize) -> &'static LimitedAlloc {
        Box::leak(Box::new(LimitedAlloc {
            failing: AtomicUsize::new(failures),
            remaining: AtomicUsize::new(allowed),
            live: AtomicUsize::new(0),
            reallocs: AtomicUsize::new(0),
            refused: AtomicUsize::new(0),
        }))
    }

    /// Returns a reporting policy allocating from self.
    pub fn reporting(&'static self) -> AllocPolicy {
        AllocPolicy::reporting().allocator(self)
    }

    /// Returns a strict policy allocating from self, with a backoff short enough for tests.
    pub fn strict(&'static self) -> AllocPolicy {
        AllocPolicy::strict().backoff(Duration::from_micros(1)).allocator(self)
    }

    /// The number of blocks allocated but not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// The number of successful reallocations.
    pub fn reallocs(&self) -> usize {
        self.reallocs.load(Ordering::SeqCst)
    }

    /// The number of requests answered with a null pointer.
    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::SeqCst)
    }

    /// Allows another `count` requests to succeed.
    pub fn refill(&self, count: usize) {
        self.remaining.fetch_add(count, Ordering::SeqCst);
    }

    fn take(&self) -> bool {
        let decrement = |n: usize| n.checked_sub(1);
        let served = self.failing.fetch_update(Ordering::SeqCst, Ordering::SeqCst, decrement).is_err()
            && self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, decrement).is_ok();
        if !served {
            self.refused.fetch_add(1, Ordering::SeqCst);
        }
        served
    }
}

// SAFETY: All requests are forwarded to System unchanged, or refused with a null pointer.
unsafe impl GlobalAlloc for LimitedAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !self.take() {
            return ptr::null_mut();
        }
        // SAFETY: Upheld by the caller.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.live.fetch_add(1, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: Upheld by the caller.
        unsafe { System.dealloc(ptr, layout) };
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if !self.take() {
            return ptr::null_mut();
        }
        // SAFETY: Upheld by the caller.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.reallocs.fetch_add(1, Ordering::SeqCst);
        }
        new_ptr
    }
}

/// Installs the test log backend, ignoring repeated initialization from other tests.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
