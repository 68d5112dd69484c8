//! Reading lines and whole inputs into exact-fit buffers.
//!
//! Lines are read a byte at a time from any [`ByteSource`], which every [`BufRead`](std::io::BufRead)
//! is. Whole inputs are read from any [`Read`](std::io::Read), in chunks as large as the buffer has
//! room for. Reading from a raw descriptor or a path lives in [`fs`](crate::fs).

mod bulk;
mod error;
mod line;
mod source;
mod tests;

pub use bulk::*;
pub use error::*;
pub use line::*;
pub use source::*;
