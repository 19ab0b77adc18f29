//! Conductor Material

use rtcore::interaction::*;
use rtcore::material::*;
use rtcore::pbrt::*;
use rtcore::reflection::*;
use rtcore::spectrum::*;

/// Implements a rough metal with a Trowbridge-Reitz microfacet distribution.
pub struct ConductorMaterial {
    /// Reflectance at normal incidence.
    r: Spectrum,

    /// Width of the microfacet distribution.
    alpha: Float,
}

impl ConductorMaterial {
    /// Create a new `ConductorMaterial`.
    ///
    /// * `r`     - Reflectance at normal incidence.
    /// * `alpha` - Width of the microfacet distribution.
    pub fn new(r: Spectrum, alpha: Float) -> Result<Self, String> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(format!("Conductor roughness must be in (0, 1], got {alpha}"));
        }
        Ok(Self { r, alpha })
    }
}

impl Material for ConductorMaterial {
    fn compute_bsdf(&self, si: &SurfaceInteraction) -> Option<BSDF> {
        let bxdf = BxDF::MicrofacetReflection {
            r: self.r,
            distribution: TrowbridgeReitzDistribution::new(self.alpha),
        };
        Some(BSDF::new(&si.n, bxdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use float_cmp::*;
    use rtcore::geometry::*;
    use std::sync::Arc;

    #[test]
    fn glossy_lobe_around_mirror_direction() {
        let si = hit_from_above(Arc::new(ConductorMaterial::new(Spectrum::new(0.9), 0.1).unwrap()));
        let bsdf = si.bsdf.as_ref().unwrap();
        assert!(!bsdf.is_specular());
        assert!(approx_eq!(Float, bsdf.roughness(), 0.1));

        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let sample = bsdf.sample_f(&wo, &Point2f::new(0.3, 0.6)).unwrap();
        assert!(sample.wi.dot(&Vector3f::new(-0.6, 0.0, 0.8)) > 0.8);
        assert!(approx_eq!(Float, sample.pdf, bsdf.pdf(&wo, &sample.wi), epsilon = 1e-3 * sample.pdf));
    }

    #[test]
    fn invalid_roughness() {
        assert!(ConductorMaterial::new(Spectrum::new(0.9), 0.0).is_err());
        assert!(ConductorMaterial::new(Spectrum::new(0.9), 1.5).is_err());
    }
}
