//! Participating Media

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampler::*;
use crate::spectrum::*;
use std::sync::Arc;

mod henyey_greenstein;

// Re-exports
pub use henyey_greenstein::*;

/// Result of sampling a scattering distance along a ray.
#[derive(Copy, Clone, Debug)]
pub struct MediumSample {
    /// Parametric distance of the sampled scattering event; `None` when the ray passed through to `t_max`.
    pub t: Option<Float>,

    /// Throughput weight: `Tr·σs/pdf` for a scattering event, `Tr/pdf` otherwise.
    pub weight: Spectrum,
}

impl MediumSample {
    /// Returns a sample for a ray that reached its end point.
    ///
    /// * `weight` - Throughput weight.
    pub fn passed(weight: Spectrum) -> Self {
        Self { t: None, weight }
    }

    /// Returns a sample for a scattering event.
    ///
    /// * `t`      - Parametric distance of the event.
    /// * `weight` - Throughput weight.
    pub fn scattered(t: Float, weight: Spectrum) -> Self {
        Self { t: Some(t), weight }
    }

    /// Returns `true` if a scattering event was sampled.
    pub fn is_scattered(&self) -> bool {
        self.t.is_some()
    }
}

/// Medium trait to handle volumetric scattering properties.
pub trait Medium {
    /// Returns the beam transmittance along a ray between its origin and `ray.t_max`. The direction need not be
    /// normalized; `t_max` is in units of the ray direction.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn eval_transmittance(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Spectrum;

    /// Stochastically sample a scattering distance along a ray up to `ray.t_max`.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample_distance(&self, ray: &Ray, sampler: &mut dyn Sampler) -> MediumSample;

    /// Returns the phase function used at scattering events inside the medium.
    fn phase(&self) -> HenyeyGreenstein;
}

/// Atomic reference counted `Medium`.
pub type ArcMedium = Arc<dyn Medium + Send + Sync>;

/// MediumInterface represents the boundary interface between two media.
#[derive(Clone, Default)]
pub struct MediumInterface {
    /// Represent the interior of a geometric primitive.
    pub inside: Option<ArcMedium>,

    /// Represent the exterior of a geometric primitive.
    pub outside: Option<ArcMedium>,
}

impl MediumInterface {
    /// Create a medium interface between two media.
    ///
    /// * `inside`  - The interior medium.
    /// * `outside` - The exterior medium.
    pub fn new(inside: Option<ArcMedium>, outside: Option<ArcMedium>) -> Self {
        Self { inside, outside }
    }

    /// Returns the medium on the side of the interface a direction points to. Directions in the hemisphere of the
    /// outward facing normal lead outside.
    ///
    /// * `n` - Outward facing geometric normal.
    /// * `w` - The direction.
    pub fn get_medium(&self, n: &Normal3f, w: &Vector3f) -> Option<ArcMedium> {
        if n.dot(w) > 0.0 {
            self.outside.clone()
        } else {
            self.inside.clone()
        }
    }
}
