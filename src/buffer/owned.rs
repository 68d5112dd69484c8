use std::ffi::CStr;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::ptr;
use std::str::{self, Utf8Error};

use super::GrowableBuffer;
use crate::alloc::{AllocError, AllocPolicy, RawArray};

/// An exact-fit, immutable-sized byte buffer, as produced by finalizing a [`GrowableBuffer`].
///
/// The allocation holds exactly the bytes of the buffer, plus a single NUL byte when the buffer is
/// terminated. The terminator is never part of the dereferenced slice.
pub struct OwnedBytes {
    pub(crate) arr: RawArray<u8>,
    pub(crate) terminated: bool,
}

impl OwnedBytes {
    /// Copies `bytes` into a new, terminated buffer of exactly `bytes.len() + 1` bytes.
    ///
    /// # Errors
    /// Fails if the allocation is exhausted and the policy is reporting.
    ///
    /// # Examples
    /// ```
    /// # use utility_lib::alloc::AllocPolicy;
    /// # use utility_lib::buffer::OwnedBytes;
    /// let dup = OwnedBytes::duplicate(b"hello", AllocPolicy::reporting()).unwrap();
    /// assert_eq!(dup, "hello");
    /// assert_eq!(dup.cap(), 6);
    /// ```
    pub fn duplicate(bytes: &[u8], policy: AllocPolicy) -> Result<OwnedBytes, AllocError> {
        let mut arr = RawArray::<u8>::new_uninit(bytes.len() + 1, policy)?;

        // SAFETY: arr has room for bytes and a terminator, and can't overlap with bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), arr.ptr.as_ptr().cast(), bytes.len()) };
        arr[bytes.len()].write(0);

        Ok(OwnedBytes {
            // SAFETY: Every byte has been written.
            arr: unsafe { arr.assume_init() },
            terminated: true,
        })
    }

    /// Returns the number of bytes, excluding any terminator.
    pub const fn len(&self) -> usize {
        self.arr.size() - self.terminated as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the size of the underlying allocation, which is the length plus one for a terminated
    /// buffer.
    pub const fn cap(&self) -> usize {
        self.arr.size()
    }

    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub const fn policy(&self) -> AllocPolicy {
        self.arr.policy()
    }

    /// Returns the bytes including the NUL terminator, if the buffer has one.
    pub fn as_bytes_with_nul(&self) -> Option<&[u8]> {
        self.terminated.then_some(&*self.arr)
    }

    /// Returns the buffer as a C string, if it is terminated and has no interior NUL bytes.
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul()?).ok()
    }

    /// Interprets the bytes as UTF-8.
    ///
    /// # Errors
    /// Fails if the bytes aren't valid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(self)
    }

    /// Turns the buffer back into a [`GrowableBuffer`] with the same contents, dropping the
    /// terminator. The allocation is reused.
    pub fn into_buffer(self) -> GrowableBuffer {
        let len = self.len();
        GrowableBuffer {
            arr: self.arr.forget_init(),
            len,
            init: len,
        }
    }
}

impl Deref for OwnedBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.arr[..self.len()]
    }
}

impl AsRef<[u8]> for OwnedBytes {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl PartialEq for OwnedBytes {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl Eq for OwnedBytes {}

impl PartialEq<[u8]> for OwnedBytes {
    fn eq(&self, other: &[u8]) -> bool {
        **self == *other
    }
}

impl PartialEq<&[u8]> for OwnedBytes {
    fn eq(&self, other: &&[u8]) -> bool {
        **self == **other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for OwnedBytes {
    fn eq(&self, other: &&[u8; N]) -> bool {
        **self == other[..]
    }
}

impl PartialEq<&str> for OwnedBytes {
    fn eq(&self, other: &&str) -> bool {
        **self == *other.as_bytes()
    }
}

impl Hash for OwnedBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl Debug for OwnedBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.escape_ascii())
    }
}

impl Display for OwnedBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self))
    }
}
