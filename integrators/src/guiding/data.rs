//! Training Samples

use rtcore::geometry::*;
use rtcore::pbrt::*;

/// A radiance observation used to train the guiding distribution.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SampleData {
    /// Position of the scattering vertex.
    pub position: Point3f,

    /// Normalized direction the radiance arrived from.
    pub direction: Vector3f,

    /// Scalar incident radiance.
    pub radiance: Float,

    /// Density with which `direction` was sampled.
    pub pdf: Float,

    /// Distance to the point the radiance came from.
    pub distance: Float,
}

impl SampleData {
    /// Create a new `SampleData`.
    ///
    /// * `position`  - Position of the scattering vertex.
    /// * `direction` - Normalized direction the radiance arrived from.
    /// * `radiance`  - Scalar incident radiance.
    /// * `pdf`       - Density with which `direction` was sampled.
    /// * `distance`  - Distance to the point the radiance came from.
    pub fn new(position: Point3f, direction: Vector3f, radiance: Float, pdf: Float, distance: Float) -> Self {
        Self {
            position,
            direction,
            radiance,
            pdf,
            distance,
        }
    }

    /// Returns `true` if the sample can be used for training.
    pub fn is_valid(&self) -> bool {
        if self.position.has_nans() || self.direction.has_nans() || self.direction.is_zero() {
            return false;
        }
        // `!(x > 0)` also rejects NaN.
        self.radiance > 0.0 && self.pdf > 0.0 && self.distance > 0.0
    }

    /// Returns the training weight `radiance / pdf`.
    #[inline]
    pub fn weight(&self) -> Float {
        self.radiance / self.pdf
    }
}
