#[cfg(test)]
pub mod alloc;
pub mod fatal;
pub mod panic;
