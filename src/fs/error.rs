use derive_more::{Display, Error, From, IsVariant};
use libc::{
    EACCES, EDQUOT, EIO, ELOOP, EMFILE, ENAMETOOLONG, ENFILE, ENOENT, ENOMEM, ENOSPC, ENOTDIR,
    EPERM, c_int,
};

use crate::alloc::OOMError;
use crate::read::{IOError, ReadError};
use crate::util::fatal::Fatal;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("interrupted by signal")]
pub struct InterruptError;
impl Fatal for InterruptError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("available storage space exhausted")]
pub struct StorageExhaustedError;
impl Fatal for StorageExhaustedError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("file descriptor corruption")]
pub struct BadFdError;
impl Fatal for BadFdError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("permission denied")]
pub struct AccessError;
impl Fatal for AccessError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("exceeded open file limit")]
pub struct FileCountError;
impl Fatal for FileCountError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path contains too many symlinks")]
pub struct ExcessiveLinksError;
impl Fatal for ExcessiveLinksError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path is too long")]
pub struct PathLengthError;
impl Fatal for PathLengthError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("a component of the provided path does not exist")]
pub struct MissingComponentError;
impl Fatal for MissingComponentError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("a component of the provided path is not a directory")]
pub struct NonDirComponentError;
impl Fatal for NonDirComponentError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path contains an interior NUL byte")]
pub struct InvalidPathError;
impl Fatal for InvalidPathError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("unexpected OS error with code: {_0}")]
pub struct UnexpectedError(#[error(not(source))] pub c_int);
impl Fatal for UnexpectedError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum OpenError {
    // EACCES, EPERM
    Access(AccessError),
    // ELOOP
    ExcessiveLinks(ExcessiveLinksError),
    // EMFILE, ENFILE
    FileCount(FileCountError),
    // NUL in path, never reaches the OS
    InvalidPath(InvalidPathError),
    // ENOENT
    MissingComponent(MissingComponentError),
    // ENOTDIR
    NonDirComponent(NonDirComponentError),
    // ENOMEM, after retries
    OOM(OOMError),
    // ENAMETOOLONG
    PathLength(PathLengthError),
    Unexpected(UnexpectedError),
}
impl Fatal for OpenError {}

impl OpenError {
    pub(crate) const fn from_errno(code: c_int) -> OpenError {
        match code {
            EACCES | EPERM => OpenError::Access(AccessError),
            ELOOP =>          OpenError::ExcessiveLinks(ExcessiveLinksError),
            EMFILE | ENFILE => OpenError::FileCount(FileCountError),
            ENOENT =>         OpenError::MissingComponent(MissingComponentError),
            ENOTDIR =>        OpenError::NonDirComponent(NonDirComponentError),
            ENOMEM =>         OpenError::OOM(OOMError),
            ENAMETOOLONG =>   OpenError::PathLength(PathLengthError),
            e =>              OpenError::Unexpected(UnexpectedError(e)),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum CloseError {
    BadFd(BadFdError),
    Interrupt(InterruptError),
    IO(IOError),
    StorageExhausted(StorageExhaustedError),
    Unexpected(UnexpectedError),
}
impl Fatal for CloseError {}

impl CloseError {
    pub(crate) const fn from_errno(code: c_int) -> CloseError {
        match code {
            libc::EBADF =>     CloseError::BadFd(BadFdError),
            libc::EINTR =>     CloseError::Interrupt(InterruptError),
            EIO =>             CloseError::IO(IOError),
            ENOSPC | EDQUOT => CloseError::StorageExhausted(StorageExhaustedError),
            e =>               CloseError::Unexpected(UnexpectedError(e)),
        }
    }
}

/// The ways in which reading a whole file by path can fail, by the step that failed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum ReadFileError {
    Open(OpenError),
    Read(ReadError),
    Close(CloseError),
}
impl Fatal for ReadFileError {}
