use std::error::Error;
use std::process;

/// An error which terminates the process when it occurs under a
/// [`Strict`](crate::alloc::FailureMode::Strict) policy.
pub trait Fatal: Error {
    fn fatal(&self) -> ! {
        log::error!("[FATAL] {}", self);
        eprintln!("fatal: {}", self);
        process::abort()
    }
}
