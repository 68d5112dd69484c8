//! Descriptor-level reading on top of thin `libc` wrappers.
#![cfg(target_os = "linux")]

mod error;
mod fd;
mod read;
mod syscall;

pub use error::*;
pub use fd::Fd;
pub(crate) use fd::FdReader;
pub use read::*;
pub(crate) use syscall::*;
