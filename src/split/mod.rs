//! Splitting byte strings into tokens on a single separator byte, either copying every token or
//! borrowing them from the input.

mod tokens;

pub use tokens::*;
