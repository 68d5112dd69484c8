use std::ffi::CString;
use std::fmt::{self, Debug, Formatter};
use std::io::{self, Read};
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc::{EINTR, ENOMEM, O_CLOEXEC, c_int};

use super::{CloseError, InvalidPathError, OpenError, err_no};
use crate::alloc::AllocPolicy;

/// An owned file descriptor, closed when dropped.
pub struct Fd(c_int);

impl Fd {
    /// Opens the file at `path` with the provided `flags` (`O_CLOEXEC` is always added).
    ///
    /// An open interrupted by a signal is retried until it completes. An open which fails for lack
    /// of kernel memory is retried according to `policy`, and any other failure is surfaced through
    /// it.
    ///
    /// # Errors
    /// Fails if the file can't be opened and the policy is reporting.
    pub fn open<P: AsRef<Path>>(path: P, flags: c_int, policy: AllocPolicy) -> Result<Fd, OpenError> {
        let path = path.as_ref();
        let Ok(pathname) = CString::new(path.as_os_str().as_bytes()) else {
            return policy.surface(InvalidPathError.into());
        };

        let mut attempt = 0;
        loop {
            // SAFETY: pathname is a valid C string which outlives the call, and no mode is needed
            // without O_CREAT.
            match unsafe { libc::open(pathname.as_ptr(), flags | O_CLOEXEC) } {
                -1 => {
                    if let Some(e) = retry_open(err_no(), &mut attempt, policy, path) {
                        return policy.surface(e);
                    }
                },
                fd => {
                    log::debug!("opened {} as fd {}", path.display(), fd);
                    return Ok(Fd(fd));
                },
            }
        }
    }

    /// Takes ownership of a raw descriptor.
    ///
    /// # Safety
    /// `fd` must be open and not owned by anything else.
    pub const unsafe fn from_raw(fd: RawFd) -> Fd {
        Fd(fd)
    }

    /// Closes the descriptor, reporting any error instead of just logging it as dropping does.
    ///
    /// # Errors
    /// The descriptor is invalidated regardless of the outcome, but the close may have failed to
    /// flush or been interrupted.
    pub fn close(self) -> Result<(), CloseError> {
        let fd = self.into_raw_fd();
        // SAFETY: close invalidates the descriptor regardless of the outcome, and self has been
        // consumed so it is never used again.
        if unsafe { libc::close(fd) } == -1 {
            Err(CloseError::from_errno(err_no()))?
        }
        Ok(())
    }
}

/// Decides what to do about an open of `path` which failed with `code`: [`None`] to try again, or
/// the error to give up with. `attempt` counts the retries made for lack of memory.
pub(crate) fn retry_open(code: c_int, attempt: &mut u32, policy: AllocPolicy, path: &Path) -> Option<OpenError> {
    match code {
        EINTR => {
            log::warn!("open of {} interrupted, retrying", path.display());
            None
        },
        ENOMEM if policy.retry(attempt, format_args!("open of {}", path.display())) => None,
        e => Some(OpenError::from_errno(e)),
    }
}

/// Reads through a borrowed descriptor without taking ownership of it.
pub(crate) struct FdReader<'a>(pub BorrowedFd<'a>);

impl Read for FdReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: buf is valid for writes of buf.len() bytes.
        match unsafe { libc::read(self.0.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) } {
            -1 => Err(io::Error::last_os_error()),
            count => Ok(count.unsigned_abs()),
        }
    }
}

impl Read for Fd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FdReader(self.as_fd()).read(buf)
    }
}

impl AsFd for Fd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        // SAFETY: self.0 stays open for as long as self is borrowed.
        unsafe { BorrowedFd::borrow_raw(self.0) }
    }
}

impl AsRawFd for Fd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

impl IntoRawFd for Fd {
    fn into_raw_fd(self) -> RawFd {
        let fd = self.0;
        mem::forget(self);
        fd
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        // SAFETY: After this, the file descriptor is invalidated but we are dropping self so it
        // doesn't matter.
        if unsafe { libc::close(self.0) } == -1 {
            log::warn!("error while dropping fd {}: {}", self.0, CloseError::from_errno(err_no()));
        }
    }
}

impl Debug for Fd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Fd({})", self.0)
    }
}
