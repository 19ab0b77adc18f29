//! BSDF

use super::*;

/// BSDF wraps a `BxDF` with the local shading frame of a surface point and works with world space directions.
#[derive(Copy, Clone, Debug)]
pub struct BSDF {
    /// Shading frame.
    pub frame: Frame,

    /// Geometric normal.
    pub ng: Normal3f,

    /// The scattering model.
    pub bxdf: BxDF,
}

impl BSDF {
    /// Create a new `BSDF`.
    ///
    /// * `ng`   - Geometric normal, also used as the shading normal.
    /// * `bxdf` - The scattering model.
    pub fn new(ng: &Normal3f, bxdf: BxDF) -> Self {
        Self {
            frame: Frame::from_normal(ng),
            ng: *ng,
            bxdf,
        }
    }

    /// Transform a world space direction to the local shading frame.
    ///
    /// * `v` - The direction.
    #[inline]
    pub fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_local(v)
    }

    /// Transform a local shading frame direction to world space.
    ///
    /// * `v` - The direction.
    #[inline]
    pub fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_world(v)
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        self.bxdf.get_type()
    }

    /// Returns the scalar roughness of the scattering model.
    pub fn roughness(&self) -> Float {
        self.bxdf.roughness()
    }

    /// Returns `true` if the scattering model only has delta lobes.
    pub fn is_specular(&self) -> bool {
        self.get_type().contains(BxDFType::BSDF_SPECULAR)
    }

    /// Returns the value of the distribution function for the given pair of world space directions.
    ///
    /// * `wo_w` - Outgoing direction.
    /// * `wi_w` - Incident direction.
    pub fn f(&self, wo_w: &Vector3f, wi_w: &Vector3f) -> Spectrum {
        let wo = self.world_to_local(wo_w);
        let wi = self.world_to_local(wi_w);
        if wo.z == 0.0 {
            return Spectrum::default();
        }
        self.bxdf.f(&wo, &wi)
    }

    /// Evaluates the PDF of `sample_f()` for a pair of world space directions.
    ///
    /// * `wo_w` - Outgoing direction.
    /// * `wi_w` - Incident direction.
    pub fn pdf(&self, wo_w: &Vector3f, wi_w: &Vector3f) -> Float {
        let wo = self.world_to_local(wo_w);
        let wi = self.world_to_local(wi_w);
        if wo.z == 0.0 {
            return 0.0;
        }
        self.bxdf.pdf(&wo, &wi)
    }

    /// Samples a world space incident direction.
    ///
    /// * `wo_w` - Outgoing direction.
    /// * `u`    - The 2D uniform random values.
    pub fn sample_f(&self, wo_w: &Vector3f, u: &Point2f) -> Option<BxDFSample> {
        let wo = self.world_to_local(wo_w);
        let mut sample = self.bxdf.sample_f(&wo, u)?;
        if sample.pdf <= 0.0 || sample.f.is_black() {
            return None;
        }
        sample.wi = self.local_to_world(&sample.wi);
        Some(sample)
    }
}
