//! Helpers for building a new terminated buffer out of several byte strings.

use super::{GrowableBuffer, OwnedBytes};
use crate::alloc::{AllocError, AllocPolicy, CapacityOverflowError};

/// The separator placed between the components joined by [`make_path`].
pub const PATH_SEPARATOR: u8 = b'/';

/// Concatenates all of `parts` into a new terminated buffer of exactly the combined length plus
/// one.
///
/// # Errors
/// Fails if the allocation is exhausted or the combined length overflows, and the policy is
/// reporting.
///
/// # Examples
/// ```
/// # use utility_lib::alloc::AllocPolicy;
/// # use utility_lib::buffer::concat;
/// let joined = concat(&[b"foo", b"bar", b"baz"], AllocPolicy::reporting()).unwrap();
/// assert_eq!(joined, "foobarbaz");
/// assert_eq!(joined.cap(), 10);
/// ```
pub fn concat(parts: &[&[u8]], policy: AllocPolicy) -> Result<OwnedBytes, AllocError> {
    let total = match parts
        .iter()
        .try_fold(1_usize, |acc, part| acc.checked_add(part.len()))
    {
        Some(total) => total,
        None => policy.surface(CapacityOverflowError)?,
    };

    let mut buf = GrowableBuffer::with_cap(total, policy)?;
    for part in parts {
        buf.extend_from_slice(part)?;
    }
    buf.finalize(true)
}

/// Creates a new terminated buffer holding `first` followed by `second`, leaving both untouched.
///
/// # Errors
/// See [`concat`].
pub fn const_append(first: &[u8], second: &[u8], policy: AllocPolicy) -> Result<OwnedBytes, AllocError> {
    concat(&[first, second], policy)
}

/// Appends `tail` to `base`, reusing the allocation of `base`.
///
/// # Errors
/// Fails if growing `base` is exhausted and its policy is reporting. `base` is released in that
/// case.
pub fn append(base: OwnedBytes, tail: &[u8]) -> Result<OwnedBytes, AllocError> {
    let mut buf = base.into_buffer();
    let wanted = buf.len() + tail.len() + 1;
    if wanted > buf.cap() {
        // Grow to the exact final size rather than doubling, so finalizing doesn't move it again.
        buf.arr.realloc(wanted)?;
    }
    buf.extend_from_slice(tail)?;
    buf.finalize(true)
}

/// Joins a directory path and an entry name with a single [`PATH_SEPARATOR`].
///
/// # Errors
/// See [`concat`].
///
/// # Examples
/// ```
/// # use utility_lib::alloc::AllocPolicy;
/// # use utility_lib::buffer::make_path;
/// let path = make_path(b"/usr/lib", b"libc.so", AllocPolicy::reporting()).unwrap();
/// assert_eq!(path, "/usr/lib/libc.so");
/// ```
pub fn make_path(dir: &[u8], name: &[u8], policy: AllocPolicy) -> Result<OwnedBytes, AllocError> {
    concat(&[dir, &[PATH_SEPARATOR], name], policy)
}
