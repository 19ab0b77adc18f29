//! Path Guiding
//!
//! Online learning of the incident radiance distribution with a spatial kd-tree of parallax-aware von
//! Mises-Fisher mixtures, and a path tracer that samples directions from the product of the learned
//! distribution and the BSDF.

mod cache;
mod data;
mod guided_bxdf;
mod integrator;
mod kdtree;
mod vmm;

// Re-export.
pub use cache::*;
pub use data::*;
pub use guided_bxdf::*;
pub use integrator::*;
pub use kdtree::*;
pub use vmm::*;
