//! Camera

#[macro_use]
extern crate log;

mod framing;

// Re-export
pub use framing::*;
