//! This crate is my collection of small utilities for reading, splitting and pooling bytes, all of
//! which share a single allocation policy.
//!
//! # Purpose
//! These are the pieces I keep reaching for in small command line tools: read a line (or a whole
//! file) into a buffer that fits it exactly, split it on a separator, and hand out fixed-size chunks
//! of memory without going back to the allocator every time.
//!
//! # Allocation Policy
//! Every component takes an [`AllocPolicy`](alloc::AllocPolicy) when it is created, and every
//! allocation it makes goes through that policy. A policy is either:
//! - *Strict*, where exhausted allocations are retried a few times with a short backoff before the
//!   process is terminated. Callers never have to handle a failure.
//! - *Reporting*, where failures are returned straight away as strongly typed [`Result`]s.
//!
//! The process-wide default can be installed once at startup with
//! [`AllocPolicy::install`](alloc::AllocPolicy::install), and is strict until then.
//!
//! # Error Handling
//! Errors are structs (mostly ZSTs) implementing [`Error`](std::error::Error), combined into an
//! enum per operation for static dispatch. Under a strict policy the same errors are logged and
//! terminate the process instead.
//!
//! # Features
//! Each component sits behind its own feature, all enabled by default: `read`, `fs` (which relies
//! on `libc` for its thin syscall wrappers), `split`, `pool` and `concat`.
//!
//! # Logging
//! Retries, growth and failures are logged through the [`log`] facade. Nothing is printed unless
//! the application installs a logger.

// #![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod alloc;
pub mod buffer;
#[cfg(feature = "fs")]
pub mod fs;
#[cfg(feature = "pool")]
pub mod pool;
#[cfg(feature = "read")]
pub mod read;
#[cfg(feature = "split")]
pub mod split;

pub(crate) mod util;
