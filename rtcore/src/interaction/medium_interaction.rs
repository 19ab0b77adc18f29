//! Medium Interaction

use super::*;

/// A scattering event inside a participating medium.
#[derive(Clone)]
pub struct MediumInteraction {
    /// Scattering point.
    pub p: Point3f,

    /// Direction towards the ray origin.
    pub wo: Vector3f,

    /// The medium containing the point.
    pub medium: ArcMedium,

    /// The medium's phase function.
    pub phase: HenyeyGreenstein,
}

impl MediumInteraction {
    /// Create a new `MediumInteraction`.
    ///
    /// * `p`      - Scattering point.
    /// * `wo`     - Direction towards the ray origin.
    /// * `medium` - The medium containing the point.
    pub fn new(p: Point3f, wo: Vector3f, medium: ArcMedium) -> Self {
        let phase = medium.phase();
        Self { p, wo, medium, phase }
    }

    /// Spawn a ray leaving the scattering point. It stays inside the same medium.
    ///
    /// * `d` - Normalized direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        Ray::new(self.p, *d, INFINITY, Some(self.medium.clone()))
    }
}
