//! Camera

use crate::geometry::*;
use std::sync::Arc;

/// Holds all the sample values needed to specify a camera ray.
#[derive(Copy, Clone, Debug, Default)]
pub struct CameraSample {
    /// Point on the film to which the generated ray carries radiance.
    pub p_film: Point2f,
}

impl CameraSample {
    /// Create a new `CameraSample`.
    ///
    /// * `p_film` - Point on the film in raster space.
    pub fn new(p_film: Point2f) -> Self {
        Self { p_film }
    }
}

/// Camera interface.
pub trait Camera {
    /// Returns a normalized world space ray corresponding to a sample position on the film plane.
    ///
    /// * `sample` - The camera sample.
    fn generate_ray(&self, sample: &CameraSample) -> Ray;
}

/// Atomic reference counted `Camera`.
pub type ArcCamera = Arc<dyn Camera + Send + Sync>;
