//! Integrator

use crate::geometry::*;
use crate::pbrt::*;
use crate::scene::Scene;
use crate::spectrum::*;

mod local_record;
mod path_tracer;
mod scheduler;
mod strategy;

// Re-export.
pub use local_record::*;
pub use path_tracer::*;
pub use scheduler::*;
pub use strategy::*;

/// Integrator interface.
pub trait Integrator {
    /// Render the scene into the film.
    ///
    /// * `scene` - The scene.
    fn render(&self, scene: &Scene);

    /// Write the film to an image file.
    ///
    /// * `path` - Output file path; the extension selects the format.
    fn save(&self, path: &str) -> Result<(), String>;
}
