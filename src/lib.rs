pub mod datatypes;
pub mod error;
pub mod memo;
pub mod meta;
pub mod operators;
pub mod session;
pub mod statistics;
#[cfg(test)]
pub mod testing;
