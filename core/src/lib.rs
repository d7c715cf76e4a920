//! Core

#[macro_use]
extern crate log;

// Re-export.
pub mod app;
pub mod config;
pub mod error;
pub mod fileutil;
#[macro_use]
pub mod geometry;
pub mod group;
pub mod output;
pub mod pnr;
pub mod resolution;
