//! Samplers

#[macro_use]
extern crate log;

mod halton;
mod random;

// Re-export.
pub use halton::*;
pub use random::*;
