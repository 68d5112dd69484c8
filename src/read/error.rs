use std::io::{self, ErrorKind};

use derive_more::{Display, Error, From, IsVariant};

use crate::alloc::{AllocError, CapacityOverflowError, OOMError};
use crate::util::fatal::Fatal;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("error during I/O")]
pub struct IOError;
impl Fatal for IOError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("operation would block but source is non-blocking")]
pub struct WouldBlockError;
impl Fatal for WouldBlockError {}

/// The ways in which reading from a source into a buffer can fail.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum ReadError {
    OOM(OOMError),
    CapacityOverflow(CapacityOverflowError),
    WouldBlock(WouldBlockError),
    IO(IOError),
}
impl Fatal for ReadError {}

impl From<AllocError> for ReadError {
    fn from(value: AllocError) -> Self {
        match value {
            AllocError::OOM(e) => e.into(),
            AllocError::CapacityOverflow(e) => e.into(),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            ErrorKind::OutOfMemory => OOMError.into(),
            ErrorKind::WouldBlock =>  WouldBlockError.into(),
            _ =>                      IOError.into(),
        }
    }
}
