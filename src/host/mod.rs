//! Host platform glue for the binary

pub mod console;
pub mod logger;
