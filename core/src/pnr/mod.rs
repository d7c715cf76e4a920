//! Pixel-normalized rendering common stuff

mod axis;
mod clamp;
mod common;

// Re-export
pub use axis::*;
pub use clamp::*;
pub use common::*;
