//! The growable byte buffer and the exact-fit owned bytes it produces.
//!
//! A [`GrowableBuffer`] starts at [`INITIAL_CAP`] bytes and doubles whenever it fills up. Once the
//! data is complete it is finalized into an [`OwnedBytes`], trading one last reallocation for an
//! allocation that holds the data (and optionally a NUL terminator) and not a single byte more.

#[cfg(feature = "concat")]
mod concat;
mod growable;
mod owned;

#[cfg(feature = "concat")]
pub use concat::*;
pub use growable::*;
pub use owned::*;
