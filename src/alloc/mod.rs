//! The allocation policy and the policy-checked memory underlying every other module.
//!
//! # Purpose
//! Every allocation made by this crate goes through an [`AllocPolicy`], which decides what happens
//! when memory runs out: either retry a bounded number of times before terminating the process
//! ([`FailureMode::Strict`]), or return an [`AllocError`] to the caller straight away
//! ([`FailureMode::Reporting`]). Components never make that decision themselves, so switching
//! modes never requires touching them.
//!
//! [`RawArray`] is the only type which actually owns raw memory.

mod error;
mod policy;
mod raw_array;

pub use error::*;
pub use policy::*;
pub use raw_array::*;
