//! A fixed-capacity pool of equally sized memory slots.

mod slot_pool;
mod tests;

pub use slot_pool::*;
