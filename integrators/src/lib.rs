//! Integrators

#[macro_use]
extern crate log;

pub mod guiding;
mod path;
mod volpath;

// Re-export.
pub use path::*;
pub use volpath::*;
