use super::{ByteSource, Lines, ReadError};
use crate::alloc::AllocPolicy;
use crate::buffer::{GrowableBuffer, OwnedBytes};

/// Reads a single line from `source`, excluding the trailing `'\n'`.
///
/// The line is returned as an exact-fit, terminated buffer. If the end of the input is reached
/// before any byte was read, [`None`] is returned instead, which is distinct from an empty line:
///
/// ```
/// # use utility_lib::alloc::AllocPolicy;
/// # use utility_lib::read::read_line;
/// let mut source: &[u8] = b"\nlast";
/// let policy = AllocPolicy::reporting();
///
/// assert_eq!(read_line(&mut source, policy).unwrap().unwrap(), "");
/// assert_eq!(read_line(&mut source, policy).unwrap().unwrap(), "last");
/// assert!(read_line(&mut source, policy).unwrap().is_none());
/// ```
///
/// # Errors
/// Fails if reading from the source fails or the buffer is exhausted, and the policy is reporting.
/// Bytes consumed before the failure are lost.
pub fn read_line<S>(source: &mut S, policy: AllocPolicy) -> Result<Option<OwnedBytes>, ReadError>
where
    S: ByteSource + ?Sized,
{
    let mut buf = GrowableBuffer::new(policy)?;
    let mut newline = false;

    loop {
        match source.next_byte() {
            Ok(Some(b'\n')) => {
                newline = true;
                break;
            },
            Ok(Some(byte)) => buf.push(byte)?,
            Ok(None) => break,
            Err(e) => return policy.surface(e),
        }
    }

    if buf.is_empty() && !newline {
        return Ok(None);
    }
    Ok(Some(buf.finalize(true)?))
}

/// Returns an iterator reading one line at a time from `source`.
pub fn lines<S: ByteSource + ?Sized>(source: &mut S, policy: AllocPolicy) -> Lines<'_, S> {
    Lines {
        source,
        policy,
        done: false,
    }
}
