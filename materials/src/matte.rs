//! Matte Material

use rtcore::interaction::*;
use rtcore::material::*;
use rtcore::reflection::*;
use rtcore::spectrum::*;

/// Implements purely diffuse surfaces.
pub struct MatteMaterial {
    /// Spectral diffuse reflection.
    kd: Spectrum,
}

impl MatteMaterial {
    /// Create a new `MatteMaterial`.
    ///
    /// * `kd` - Spectral diffuse reflection.
    pub fn new(kd: Spectrum) -> Self {
        Self { kd }
    }
}

impl Material for MatteMaterial {
    /// Returns a Lambertian BSDF. Black reflectance still produces a BSDF so the
    /// surface blocks light instead of becoming a medium boundary.
    ///
    /// * `si` - The surface interaction at the intersection.
    fn compute_bsdf(&self, si: &SurfaceInteraction) -> Option<BSDF> {
        Some(BSDF::new(&si.n, BxDF::LambertianReflection { r: self.kd }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use float_cmp::*;
    use rtcore::geometry::*;
    use rtcore::pbrt::*;
    use std::sync::Arc;

    #[test]
    fn lambertian_value() {
        let si = hit_from_above(Arc::new(MatteMaterial::new(Spectrum::new(0.5))));
        let bsdf = si.bsdf.as_ref().unwrap();
        assert_eq!(bsdf.roughness(), 1.0);
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let f = bsdf.f(&si.wo, &wi);
        assert!(approx_eq!(Float, f[0], 0.5 * INV_PI, epsilon = 1e-6));
    }
}
