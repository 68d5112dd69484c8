use std::cmp;
use std::fmt::{self, Debug, Formatter};
use std::mem::MaybeUninit;
use std::ops::Deref;
use std::slice;

use super::OwnedBytes;
use crate::alloc::{AllocError, AllocPolicy, RawArray};

/// The capacity of a freshly created buffer.
pub const INITIAL_CAP: usize = 32;

const GROWTH_FACTOR: usize = 2;

/// A resizable byte buffer which doubles its capacity whenever it is full, and is finalized into an
/// exact-fit [`OwnedBytes`] once complete.
///
/// Capacities follow the sequence `32, 64, 128, ...`, so after `n` pushes the capacity is the
/// smallest value of that sequence which is `>= n`.
///
/// # Time Complexity
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `extend_from_slice` | `O(m)`*, `O(n+m)` |
/// | `truncate` | `O(1)` |
/// | `finalize` | `O(n)`**, `O(1)` |
///
/// \* Amortized, doubling means at most one wasted factor of 2 over the length.
///
/// \** A shrinking reallocation may need to move the data.
pub struct GrowableBuffer {
    pub(crate) arr: RawArray<MaybeUninit<u8>>,
    pub(crate) len: usize,
    /// The number of leading bytes which are initialized, always `>= len`.
    pub(crate) init: usize,
}

impl GrowableBuffer {
    /// Creates an empty buffer with capacity [`INITIAL_CAP`].
    ///
    /// # Errors
    /// Fails if the allocation is exhausted and the policy is reporting.
    pub fn new(policy: AllocPolicy) -> Result<GrowableBuffer, AllocError> {
        GrowableBuffer::with_cap(INITIAL_CAP, policy)
    }

    /// Creates an empty buffer with exactly `cap` bytes of capacity.
    ///
    /// # Errors
    /// Fails if the allocation is exhausted and the policy is reporting.
    pub fn with_cap(cap: usize, policy: AllocPolicy) -> Result<GrowableBuffer, AllocError> {
        Ok(GrowableBuffer {
            arr: RawArray::new_uninit(cap, policy)?,
            len: 0,
            init: 0,
        })
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn cap(&self) -> usize {
        self.arr.size()
    }

    pub const fn policy(&self) -> AllocPolicy {
        self.arr.policy()
    }

    /// Appends a single byte, doubling the capacity first if the buffer is full.
    ///
    /// # Errors
    /// Fails if growing is required and the allocation is exhausted, and the policy is reporting.
    /// The buffer is left as it was.
    pub fn push(&mut self, byte: u8) -> Result<(), AllocError> {
        if self.len == self.cap() {
            self.grow()?;
        }
        self.arr[self.len].write(byte);
        self.len += 1;
        self.init = cmp::max(self.init, self.len);
        Ok(())
    }

    /// Appends all of `bytes`, doubling the capacity as many times as required.
    ///
    /// # Errors
    /// See [`GrowableBuffer::push`].
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        while self.cap() - self.len < bytes.len() {
            self.grow()?;
        }
        for (slot, byte) in self.arr[self.len..].iter_mut().zip(bytes) {
            slot.write(*byte);
        }
        self.len += bytes.len();
        self.init = cmp::max(self.init, self.len);
        Ok(())
    }

    /// Shortens the buffer to `len` bytes. Has no effect if `len` is greater than the current
    /// length. The capacity is unchanged.
    pub const fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Doubles the capacity of the buffer, starting from [`INITIAL_CAP`] for an unallocated one.
    ///
    /// # Errors
    /// Fails if the allocation is exhausted or the capacity would overflow, and the policy is
    /// reporting.
    pub fn grow(&mut self) -> Result<(), AllocError> {
        let new_cap = cmp::max(self.cap().saturating_mul(GROWTH_FACTOR), INITIAL_CAP);
        log::trace!("growing buffer from {} to {} bytes", self.cap(), new_cap);
        self.arr.realloc(new_cap)
    }

    /// Returns the unused capacity of the buffer as an initialized slice, zeroing any part of it
    /// that has never been written to.
    #[cfg(feature = "read")]
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let cap = self.cap();
        for slot in &mut self.arr[self.init..cap] {
            slot.write(0);
        }
        self.init = cap;

        let spare = &mut self.arr[self.len..cap];
        // SAFETY: Every byte below init (which is now cap) is initialized, and MaybeUninit<u8> has
        // the same layout as u8.
        unsafe { slice::from_raw_parts_mut(spare.as_mut_ptr().cast(), spare.len()) }
    }

    /// Marks `count` more bytes of the spare capacity as part of the buffer.
    ///
    /// # Safety
    /// `len + count` must not exceed the initialized part of the buffer, as last returned by
    /// [`spare_mut`](GrowableBuffer::spare_mut).
    #[cfg(feature = "read")]
    pub(crate) const unsafe fn advance(&mut self, count: usize) {
        self.len += count;
    }

    /// Consumes the buffer, shrinking its allocation to exactly the length, plus one byte for a
    /// NUL terminator if `terminate` is true.
    ///
    /// # Errors
    /// Fails if the final reallocation is exhausted and the policy is reporting. The buffer is
    /// released in that case.
    pub fn finalize(mut self, terminate: bool) -> Result<OwnedBytes, AllocError> {
        let len = self.len;
        let size = len + usize::from(terminate);

        log::trace!("finalizing buffer of {} bytes from capacity {}", size, self.cap());
        self.arr.realloc(size)?;
        if terminate {
            self.arr[len].write(0);
        }

        // SAFETY: The Array now holds exactly the len written bytes and the optional terminator.
        let arr = unsafe { self.arr.assume_init() };
        Ok(OwnedBytes { arr, terminated: terminate })
    }
}

impl Deref for GrowableBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The first len bytes are initialized and MaybeUninit<u8> has the same layout as u8.
        unsafe { slice::from_raw_parts(self.arr.ptr.as_ptr().cast(), self.len) }
    }
}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl Debug for GrowableBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("contents", &self.escape_ascii().to_string())
            .field("len", &self.len)
            .field("cap", &self.cap())
            .finish()
    }
}
