//! Light

use crate::geometry::*;
use crate::interaction::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::sync::Arc;

mod light_type;

// Re-export
pub use light_type::*;

/// Return value for `Light::sample_direct()`.
#[derive(Copy, Clone, Debug)]
pub struct LightSample {
    /// Normalized direction from the reference point towards the light.
    pub wi: Vector3f,

    /// Unoccluded radiance arriving at the reference point.
    pub value: Spectrum,

    /// Solid angle density of `wi`; `1` for delta lights.
    pub pdf: Float,

    /// Distance to the sampled point; infinite for environment lights.
    pub distance: Float,

    /// Whether the sample comes from a delta distribution.
    pub is_delta: bool,
}

impl LightSample {
    /// Return a new `LightSample`.
    ///
    /// * `wi`       - Normalized direction towards the light.
    /// * `value`    - Unoccluded incident radiance.
    /// * `pdf`      - Solid angle density of `wi`.
    /// * `distance` - Distance to the sampled point.
    /// * `is_delta` - Whether the sample comes from a delta distribution.
    pub fn new(wi: Vector3f, value: Spectrum, pdf: Float, distance: Float, is_delta: bool) -> Self {
        Self {
            wi,
            value,
            pdf,
            distance,
            is_delta,
        }
    }
}

/// Return value for `Light::eval()` and `Light::eval_environment()`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LightEval {
    /// Emitted radiance.
    pub value: Spectrum,

    /// Solid angle density with which `Light::sample_direct()` would have produced the direction.
    pub pdf: Float,
}

impl LightEval {
    /// Return a new `LightEval`.
    ///
    /// * `value` - Emitted radiance.
    /// * `pdf`   - Solid angle density.
    pub fn new(value: Spectrum, pdf: Float) -> Self {
        Self { value, pdf }
    }
}

/// Light trait provides common behavior.
pub trait Light {
    /// Returns the type of light.
    fn get_type(&self) -> LightType;

    /// Returns whether light source is a delta light.
    fn is_delta_light(&self) -> bool {
        self.get_type().is_delta_light()
    }

    /// Sample a direction towards the light from a reference point. Returns `None` when the sample carries no
    /// radiance.
    ///
    /// * `p` - The reference point.
    /// * `u` - Sample value in [0, 1)^2.
    fn sample_direct(&self, p: &Point3f, u: &Point2f) -> Option<LightSample>;

    /// Returns radiance emitted from a surface hit on the light towards the previous path vertex along with the
    /// density `sample_direct()` assigns to that direction.
    ///
    /// * `ref_p` - The previous path vertex.
    /// * `si`    - The hit on the emitter.
    fn eval(&self, _ref_p: &Point3f, _si: &SurfaceInteraction) -> LightEval {
        LightEval::default()
    }

    /// Returns emitted radiance along a ray that escapes the scene.
    ///
    /// * `ray` - The ray.
    fn eval_environment(&self, _ray: &Ray) -> LightEval {
        LightEval::default()
    }
}

/// Atomic reference counted `Light`.
pub type ArcLight = Arc<dyn Light + Send + Sync>;
