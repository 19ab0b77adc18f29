//! Mirror Material

use rtcore::interaction::*;
use rtcore::material::*;
use rtcore::reflection::*;
use rtcore::spectrum::*;

/// Implements a perfect mirror.
pub struct MirrorMaterial {
    /// Reflectance.
    kr: Spectrum,
}

impl MirrorMaterial {
    /// Create a new `MirrorMaterial`.
    ///
    /// * `kr` - Reflectance.
    pub fn new(kr: Spectrum) -> Self {
        Self { kr }
    }
}

impl Material for MirrorMaterial {
    fn compute_bsdf(&self, si: &SurfaceInteraction) -> Option<BSDF> {
        Some(BSDF::new(&si.n, BxDF::SpecularReflection { r: self.kr }))
    }
}
