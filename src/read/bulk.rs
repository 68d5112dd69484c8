use std::cmp;
use std::io::{ErrorKind, Read};

use super::ReadError;
use crate::alloc::AllocPolicy;
use crate::buffer::{GrowableBuffer, OwnedBytes};

/// The byte which marks a text input as holding no data at all.
pub const EOT: u8 = 0x04;

/// Reads everything from `reader` until it reports the end of its input.
///
/// Each read asks for as many bytes as the buffer has room for, and the buffer doubles whenever it
/// is full. The result fits the data exactly and is not terminated. An empty input produces an
/// empty buffer.
///
/// # Errors
/// Fails if a read fails or the buffer is exhausted, and the policy is reporting. Interrupted reads
/// are retried.
pub fn read_all<R: Read + ?Sized>(reader: &mut R, policy: AllocPolicy) -> Result<OwnedBytes, ReadError> {
    let mut buf = GrowableBuffer::new(policy)?;

    loop {
        if buf.len() == buf.cap() {
            buf.grow()?;
        }

        let spare = buf.spare_mut();
        let room = spare.len();
        match reader.read(spare) {
            Ok(0) => break,
            // SAFETY: spare_mut initialized the whole spare capacity, of which count bytes are used.
            Ok(count) => unsafe { buf.advance(cmp::min(count, room)) },
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return policy.surface(e.into()),
        }
    }

    log::debug!("read {} bytes in total", buf.len());
    Ok(buf.finalize(false)?)
}

/// Reads everything from `reader` as text.
///
/// Returns [`None`] if the first byte is [`EOT`]. Otherwise any trailing bytes which aren't
/// printable ASCII (such as a final newline) are dropped and the result is terminated.
///
/// # Errors
/// See [`read_all`].
pub fn read_text<R: Read + ?Sized>(reader: &mut R, policy: AllocPolicy) -> Result<Option<OwnedBytes>, ReadError> {
    let bytes = read_all(reader, policy)?;
    if bytes.first() == Some(&EOT) {
        return Ok(None);
    }

    let keep = bytes
        .iter()
        .rposition(|b| matches!(b, 0x20..=0x7e))
        .map_or(0, |last| last + 1);

    let mut buf = bytes.into_buffer();
    buf.truncate(keep);
    Ok(Some(buf.finalize(true)?))
}
