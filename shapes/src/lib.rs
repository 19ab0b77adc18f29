//! Shapes

#[macro_use]
extern crate log;

mod sphere;

// Re-export
pub use sphere::*;
