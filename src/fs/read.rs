use std::os::fd::AsFd;
use std::path::Path;

use libc::O_RDONLY;

use super::{Fd, FdReader, ReadFileError};
use crate::alloc::AllocPolicy;
use crate::buffer::OwnedBytes;
use crate::read::{ReadError, read_all, read_text};

/// Reads everything from the descriptor `fd` until the end of its input, without closing it. See
/// [`read_all`].
///
/// # Errors
/// See [`read_all`].
pub fn read_descriptor<F: AsFd>(fd: F, policy: AllocPolicy) -> Result<OwnedBytes, ReadError> {
    read_all(&mut FdReader(fd.as_fd()), policy)
}

/// Reads everything from the descriptor `fd` as text, without closing it. See [`read_text`].
///
/// # Errors
/// See [`read_all`].
pub fn read_descriptor_text<F: AsFd>(fd: F, policy: AllocPolicy) -> Result<Option<OwnedBytes>, ReadError> {
    read_text(&mut FdReader(fd.as_fd()), policy)
}

/// Opens the file at `path`, reads all of it and closes it again.
///
/// # Errors
/// Fails if any of the three steps fails and the policy is reporting. The file is closed in every
/// case.
pub fn read_file<P: AsRef<Path>>(path: P, policy: AllocPolicy) -> Result<OwnedBytes, ReadFileError> {
    let mut fd = Fd::open(path, O_RDONLY, policy)?;
    let bytes = read_all(&mut fd, policy)?;

    if let Err(e) = fd.close() {
        return policy.surface(e.into());
    }
    Ok(bytes)
}
