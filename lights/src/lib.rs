//! Lights

#[macro_use]
extern crate log;

mod rig;

// Re-export.
pub use rig::*;
