use std::alloc::{self, GlobalAlloc, Layout, System};
use std::fmt::{self, Arguments, Debug, Formatter};
use std::ptr::NonNull;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use derive_more::IsVariant;

use super::OOMError;
use crate::util::fatal::Fatal;

/// The number of times a strict policy retries an exhausted allocation before giving up.
pub const DEFAULT_RETRIES: u32 = 3;

/// The delay between two attempts of an exhausted allocation under a strict policy.
pub const DEFAULT_BACKOFF: Duration = Duration::from_micros(100);

static GLOBAL: OnceLock<AllocPolicy> = OnceLock::new();

/// What happens once an allocation (or open) has failed for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum FailureMode {
    /// Retry exhausted allocations with a backoff, then terminate the process. Callers never
    /// observe an [`Err`].
    Strict,
    /// Return the failure to the caller straight away.
    Reporting,
}

/// The allocation and failure policy shared by every component in this crate.
///
/// A policy is a small [`Copy`] value which is handed to each constructor, so that buffers,
/// readers, token arrays and pools never decide for themselves what to do about a failure. It is
/// built in the same manner as a set of open options:
///
/// ```
/// # use std::time::Duration;
/// # use utility_lib::alloc::{AllocPolicy, FailureMode};
/// let policy = AllocPolicy::strict()
///     .retries(5)
///     .backoff(Duration::from_millis(1));
/// assert_eq!(policy.mode(), FailureMode::Strict);
/// assert_eq!(policy.max_retries(), 5);
/// ```
///
/// A process-wide default can be installed once, before any other operation runs, with
/// [`AllocPolicy::install`]. Until then, [`AllocPolicy::global`] (and [`Default`]) produce a strict
/// policy.
#[derive(Clone, Copy)]
pub struct AllocPolicy {
    mode: FailureMode,
    retries: u32,
    backoff: Duration,
    allocator: &'static (dyn GlobalAlloc + Sync),
}

impl AllocPolicy {
    /// Creates a strict policy with [`DEFAULT_RETRIES`] and [`DEFAULT_BACKOFF`], allocating from
    /// the [`System`] allocator.
    pub fn strict() -> AllocPolicy {
        AllocPolicy {
            mode: FailureMode::Strict,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
            allocator: &System,
        }
    }

    /// Creates a reporting policy allocating from the [`System`] allocator.
    pub fn reporting() -> AllocPolicy {
        AllocPolicy {
            mode: FailureMode::Reporting,
            ..AllocPolicy::strict()
        }
    }

    pub const fn mode(&self) -> FailureMode {
        self.mode
    }

    pub const fn is_strict(&self) -> bool {
        matches!(self.mode, FailureMode::Strict)
    }

    pub const fn max_retries(&self) -> u32 {
        self.retries
    }

    pub const fn delay(&self) -> Duration {
        self.backoff
    }

    /// Sets the number of retries attempted for an exhausted resource. Ignored in reporting mode.
    pub const fn retries(mut self, value: u32) -> AllocPolicy {
        self.retries = value;
        self
    }

    /// Sets the delay between two retries. Ignored in reporting mode.
    pub const fn backoff(mut self, value: Duration) -> AllocPolicy {
        self.backoff = value;
        self
    }

    /// Replaces the allocator that all memory owned under this policy comes from.
    pub fn allocator(mut self, value: &'static (dyn GlobalAlloc + Sync)) -> AllocPolicy {
        self.allocator = value;
        self
    }

    /// Installs self as the process-wide default policy. This can only happen once, any later
    /// attempt returns the rejected policy.
    pub fn install(self) -> Result<(), AllocPolicy> {
        GLOBAL.set(self)?;
        log::debug!("installed process-wide allocation policy: {:?}", self);
        Ok(())
    }

    /// Returns the installed process-wide policy, or a strict policy if none has been installed.
    pub fn global() -> AllocPolicy {
        GLOBAL.get().copied().unwrap_or_else(AllocPolicy::strict)
    }

    /// Allocates a block for `layout`, which must have a non-zero size.
    pub(crate) fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, OOMError> {
        self.attempt(layout, || {
            // SAFETY: The caller guarantees that layout has a non-zero size.
            unsafe { self.allocator.alloc(layout) }
        })
    }

    /// Resizes the block at `ptr` to `new_size` bytes. On failure, the original block is left
    /// untouched and still owned by the caller.
    ///
    /// # Safety
    /// `ptr` must have been allocated by this policy's allocator with `layout`, and `new_size` must
    /// be non-zero and not overflow [`isize::MAX`] when rounded up to `layout.align()`.
    pub(crate) unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, OOMError> {
        // The new layout is only used for reporting. The caller has already validated its size.
        let new_layout = Layout::from_size_align(new_size, layout.align()).unwrap_or(layout);
        self.attempt(new_layout, || {
            // SAFETY: Upheld by the caller.
            unsafe { self.allocator.realloc(ptr.as_ptr(), layout, new_size) }
        })
    }

    /// Returns the block at `ptr` to this policy's allocator.
    ///
    /// # Safety
    /// `ptr` must have been allocated by this policy's allocator with `layout` and not be used
    /// afterwards.
    pub(crate) unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Upheld by the caller.
        unsafe { self.allocator.dealloc(ptr.as_ptr(), layout) }
    }

    /// Decides whether another attempt should be made at an exhausted resource, sleeping for the
    /// backoff first if so. `attempt` counts the retries made so far.
    pub(crate) fn retry(&self, attempt: &mut u32, what: Arguments<'_>) -> bool {
        if self.mode.is_reporting() || *attempt >= self.retries {
            return false;
        }
        *attempt += 1;
        log::warn!(
            "{} failed, retrying in {:?} ({}/{})",
            what,
            self.backoff,
            attempt,
            self.retries,
        );
        thread::sleep(self.backoff);
        true
    }

    /// Hands a classified failure to the caller, or terminates the process under a strict policy.
    pub(crate) fn surface<T, E: Fatal>(&self, error: E) -> Result<T, E> {
        match self.mode {
            FailureMode::Strict => error.fatal(),
            FailureMode::Reporting => Err(error),
        }
    }

    fn attempt<F>(&self, layout: Layout, mut op: F) -> Result<NonNull<u8>, OOMError>
    where
        F: FnMut() -> *mut u8,
    {
        let mut attempt = 0;
        loop {
            if let Some(ptr) = NonNull::new(op()) {
                return Ok(ptr);
            }
            if !self.retry(&mut attempt, format_args!("allocation of {} bytes", layout.size())) {
                break;
            }
        }

        match self.mode {
            FailureMode::Strict => {
                log::error!(
                    "giving up on allocation of {} bytes after {} tries",
                    layout.size(),
                    attempt + 1,
                );
                alloc::handle_alloc_error(layout)
            },
            FailureMode::Reporting => Err(OOMError),
        }
    }
}

impl Default for AllocPolicy {
    fn default() -> Self {
        AllocPolicy::global()
    }
}

impl Debug for AllocPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocPolicy")
            .field("mode", &self.mode)
            .field("retries", &self.retries)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
