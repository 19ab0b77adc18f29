//! Surface Interaction

use super::*;

/// Geometric and material information about a ray hit on a surface.
#[derive(Clone)]
pub struct SurfaceInteraction {
    /// Hit point.
    pub p: Point3f,

    /// Outward facing geometric normal.
    pub n: Normal3f,

    /// Direction towards the ray origin.
    pub wo: Vector3f,

    /// Distance along the ray.
    pub t: Float,

    /// Material of the surface.
    pub material: ArcMaterial,

    /// Emission if the surface belongs to an area light.
    pub area_light: Option<ArcLight>,

    /// Media on both sides of the surface; `None` when the surface doesn't delimit media.
    pub medium_interface: Option<MediumInterface>,

    /// Scattering function; `None` for null surfaces that only delimit media.
    pub bsdf: Option<BSDF>,
}

impl SurfaceInteraction {
    /// Create a new `SurfaceInteraction` without scattering functions.
    ///
    /// * `p`                - Hit point.
    /// * `n`                - Outward facing geometric normal.
    /// * `wo`               - Direction towards the ray origin.
    /// * `t`                - Distance along the ray.
    /// * `material`         - Material of the surface.
    /// * `area_light`       - Emission if the surface belongs to an area light.
    /// * `medium_interface` - Media on both sides of the surface.
    pub fn new(
        p: Point3f,
        n: Normal3f,
        wo: Vector3f,
        t: Float,
        material: ArcMaterial,
        area_light: Option<ArcLight>,
        medium_interface: Option<MediumInterface>,
    ) -> Self {
        Self {
            p,
            n,
            wo,
            t,
            material,
            area_light,
            medium_interface,
            bsdf: None,
        }
    }

    /// Ask the material for the scattering functions at the hit point.
    pub fn compute_scattering_functions(&mut self) {
        self.bsdf = self.material.compute_bsdf(self);
    }

    /// Returns `true` if the surface has no scattering function and only marks a medium boundary.
    pub fn is_null(&self) -> bool {
        self.bsdf.is_none()
    }

    /// Returns the origin for rays leaving in direction `w`, offset off the surface to the side `w` points to.
    ///
    /// * `w` - The direction.
    pub fn offset_origin(&self, w: &Vector3f) -> Point3f {
        let offset = self.n * RAY_EPSILON;
        if self.n.dot(w) > 0.0 {
            self.p + offset
        } else {
            self.p - offset
        }
    }

    /// Returns the medium a direction leads into from this surface.
    ///
    /// * `w`       - The direction.
    /// * `current` - Medium the incoming ray travelled through; kept when the surface doesn't delimit media.
    pub fn get_medium(&self, w: &Vector3f, current: &Option<ArcMedium>) -> Option<ArcMedium> {
        match &self.medium_interface {
            Some(mi) => mi.get_medium(&self.n, w),
            None => current.clone(),
        }
    }

    /// Spawn a ray leaving the surface.
    ///
    /// * `d`       - Normalized direction.
    /// * `current` - Medium the incoming ray travelled through.
    pub fn spawn_ray(&self, d: &Vector3f, current: &Option<ArcMedium>) -> Ray {
        Ray::new(self.offset_origin(d), *d, INFINITY, self.get_medium(d, current))
    }
}
