//! Utilities shared by the Raceway crates.

pub mod logger;
pub mod time;
