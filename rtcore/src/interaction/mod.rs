//! Interactions

use crate::geometry::*;
use crate::light::*;
use crate::material::*;
use crate::medium::*;
use crate::pbrt::*;
use crate::reflection::*;

mod medium_interaction;
mod surface_interaction;

// Re-export
pub use medium_interaction::*;
pub use surface_interaction::*;

/// A scattering vertex of a path: either a point on a surface or a point inside a participating medium.
pub enum Interaction {
    /// A surface hit.
    Surface(SurfaceInteraction),

    /// A scattering event inside a medium.
    Medium(MediumInteraction),
}

impl Interaction {
    /// Returns the position of the interaction.
    pub fn p(&self) -> Point3f {
        match self {
            Self::Surface(si) => si.p,
            Self::Medium(mi) => mi.p,
        }
    }

    /// Returns the outgoing direction, pointing back along the incoming ray.
    pub fn wo(&self) -> Vector3f {
        match self {
            Self::Surface(si) => si.wo,
            Self::Medium(mi) => mi.wo,
        }
    }

    /// Returns the geometric normal for surface interactions.
    pub fn n(&self) -> Option<Normal3f> {
        match self {
            Self::Surface(si) => Some(si.n),
            Self::Medium(_) => None,
        }
    }

    /// Returns the scalar roughness at the interaction. Phase functions count as fully rough.
    pub fn roughness(&self) -> Float {
        match self {
            Self::Surface(si) => si.bsdf.as_ref().map_or(0.0, |bsdf| bsdf.roughness()),
            Self::Medium(_) => 1.0,
        }
    }

    /// Returns the surface interaction if this is one.
    pub fn as_surface(&self) -> Option<&SurfaceInteraction> {
        match self {
            Self::Surface(si) => Some(si),
            Self::Medium(_) => None,
        }
    }

    /// Spawn a ray leaving the interaction.
    ///
    /// * `d`       - Normalized direction.
    /// * `current` - Medium the incoming ray travelled through.
    pub fn spawn_ray(&self, d: &Vector3f, current: &Option<ArcMedium>) -> Ray {
        match self {
            Self::Surface(si) => si.spawn_ray(d, current),
            Self::Medium(mi) => mi.spawn_ray(d),
        }
    }

    /// Spawn a shadow ray towards a point at a given distance along `wi`. The ray stops just short of the target.
    ///
    /// * `wi`       - Normalized direction.
    /// * `distance` - Distance to the target; infinite for environment lights.
    /// * `current`  - Medium the incoming ray travelled through.
    pub fn spawn_shadow_ray(&self, wi: &Vector3f, distance: Float, current: &Option<ArcMedium>) -> Ray {
        let (origin, medium) = match self {
            Self::Surface(si) => (si.offset_origin(wi), si.get_medium(wi, current)),
            Self::Medium(mi) => (mi.p, Some(mi.medium.clone())),
        };

        if distance.is_infinite() {
            return Ray::new(origin, *wi, INFINITY, medium);
        }

        let d = self.p() + *wi * distance - origin;
        let length = d.length();
        if length > 0.0 {
            Ray::new(origin, d / length, length * (1.0 - SHADOW_EPSILON), medium)
        } else {
            Ray::new(origin, *wi, 0.0, medium)
        }
    }
}
