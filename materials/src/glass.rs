//! Glass Material

use rtcore::interaction::*;
use rtcore::material::*;
use rtcore::pbrt::*;
use rtcore::reflection::*;
use rtcore::spectrum::*;

/// Implements smooth dielectrics such as glass and water.
pub struct GlassMaterial {
    /// Spectral reflectance.
    kr: Spectrum,

    /// Spectral transmittance.
    kt: Spectrum,

    /// Index of refraction of the inside.
    eta: Float,
}

impl GlassMaterial {
    /// Create a new `GlassMaterial`.
    ///
    /// * `kr`  - Spectral reflectance.
    /// * `kt`  - Spectral transmittance.
    /// * `eta` - Index of refraction of the inside.
    pub fn new(kr: Spectrum, kt: Spectrum, eta: Float) -> Self {
        Self { kr, kt, eta }
    }
}

impl Material for GlassMaterial {
    fn compute_bsdf(&self, si: &SurfaceInteraction) -> Option<BSDF> {
        if self.kr.is_black() && self.kt.is_black() {
            return None;
        }
        let bxdf = BxDF::FresnelSpecular {
            r: self.kr,
            t: self.kt,
            eta_a: 1.0,
            eta_b: self.eta,
        };
        Some(BSDF::new(&si.n, bxdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use rtcore::geometry::*;
    use std::sync::Arc;

    #[test]
    fn transmits_into_surface() {
        let white = Spectrum::new(1.0);
        let si = hit_from_above(Arc::new(GlassMaterial::new(white, white, 1.5)));
        let bsdf = si.bsdf.as_ref().unwrap();
        assert_eq!(bsdf.roughness(), 0.0);

        // A large u[0] always picks transmission at near normal incidence.
        let sample = bsdf.sample_f(&si.wo, &Point2f::new(0.99, 0.5)).unwrap();
        assert!(sample.wi.z < 0.0);
        assert!(sample.bxdf_type.contains(BxDFType::BSDF_TRANSMISSION));
    }

    #[test]
    fn black_glass_is_a_boundary() {
        let black = Spectrum::new(0.0);
        let si = hit_from_above(Arc::new(GlassMaterial::new(black, black, 1.5)));
        assert!(si.is_null());
    }
}
