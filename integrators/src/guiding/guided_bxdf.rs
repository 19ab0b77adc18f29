//! Guided BSDF

use super::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::reflection::*;

/// Probability of sampling the BSDF instead of the learned distribution.
pub const BXDF_FRACTION: Float = 0.5;

/// One-sample MIS combination of a BSDF and a learned directional distribution. All directions are in
/// world space.
pub struct GuidedBxDF<'a> {
    /// The learned distribution, warped to the shading point.
    pub model: VMFMixture,

    /// The BSDF at the shading point.
    pub bsdf: &'a BSDF,

    /// Probability of sampling the BSDF.
    pub bxdf_fraction: Float,
}

impl<'a> GuidedBxDF<'a> {
    /// Create a new `GuidedBxDF`.
    ///
    /// * `model` - The learned distribution, warped to the shading point.
    /// * `bsdf`  - The BSDF at the shading point.
    pub fn new(model: VMFMixture, bsdf: &'a BSDF) -> Self {
        Self {
            model,
            bsdf,
            bxdf_fraction: BXDF_FRACTION,
        }
    }

    /// Returns the mixture density of the two sampling techniques.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.mix_pdf(self.bsdf.pdf(wo, wi), self.model.pdf(wi))
    }

    /// Sample an incident direction from either technique. The returned density is always the mixture
    /// density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Sample value in [0, 1)^2. The first dimension chooses the technique and is reused.
    pub fn sample(&self, wo: &Vector3f, u: &Point2f) -> Option<BxDFSample> {
        if u.x < self.bxdf_fraction {
            let reused = Point2f::new(u.x / self.bxdf_fraction, u.y);
            let mut sample = self.bsdf.sample_f(wo, &reused)?;
            sample.pdf = self.mix_pdf(sample.pdf, self.model.pdf(&sample.wi));
            Some(sample)
        } else {
            let reused = Point2f::new((u.x - self.bxdf_fraction) / (1.0 - self.bxdf_fraction), u.y);
            let wi = self.model.sample(&reused);
            let f = self.bsdf.f(wo, &wi);
            let pdf = self.pdf(wo, &wi);
            if f.is_black() || pdf <= 0.0 {
                return None;
            }
            Some(BxDFSample::new(f, pdf, wi, self.bsdf.get_type()))
        }
    }

    /// Returns `bxdf_fraction · pdf_bsdf + (1 - bxdf_fraction) · pdf_model`.
    ///
    /// * `pdf_bsdf`  - BSDF density.
    /// * `pdf_model` - Density of the learned distribution.
    #[inline]
    fn mix_pdf(&self, pdf_bsdf: Float, pdf_model: Float) -> Float {
        self.bxdf_fraction * pdf_bsdf + (1.0 - self.bxdf_fraction) * pdf_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;
    use rtcore::spectrum::*;

    fn trained_model() -> VMFMixture {
        let mut vmm = ParallaxAwareVMM::new();
        let d = Vector3f::new(0.0, 0.6, 0.8);
        let mut samples: Vec<SampleData> = (0..256)
            .map(|i| {
                let jitter = Vector3f::new(0.02 * ((i % 9) as Float - 4.0), 0.0, 0.0);
                SampleData::new(Point3f::zero(), (d + jitter).normalize(), 1.0, 1.0, 5.0)
            })
            .collect();
        vmm.update(&Point3f::zero(), &mut samples);
        vmm.get_warped(&Point3f::zero())
    }

    proptest! {
        #[test]
        fn sampled_pdf_matches_evaluation(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let bsdf = BSDF::new(
                &Normal3f::new(0.0, 0.0, 1.0),
                BxDF::LambertianReflection { r: Spectrum::new(0.8) },
            );
            let guided = GuidedBxDF::new(trained_model(), &bsdf);
            let wo = Vector3f::new(0.0, 0.0, 1.0);

            if let Some(sample) = guided.sample(&wo, &Point2f::new(u0, u1)) {
                let pdf = guided.pdf(&wo, &sample.wi);
                prop_assert!(approx_eq!(Float, sample.pdf, pdf, epsilon = 1e-4 * max(1.0, pdf)));

                let mixture = 0.5 * bsdf.pdf(&wo, &sample.wi) + 0.5 * guided.model.pdf(&sample.wi);
                prop_assert!(approx_eq!(Float, sample.pdf, mixture, epsilon = 1e-4 * max(1.0, pdf)));
            }
        }
    }

    #[test]
    fn learned_direction_is_favoured() {
        let bsdf = BSDF::new(
            &Normal3f::new(0.0, 0.0, 1.0),
            BxDF::LambertianReflection { r: Spectrum::new(0.8) },
        );
        let guided = GuidedBxDF::new(trained_model(), &bsdf);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let toward = Vector3f::new(0.0, 0.6, 0.8);
        let away = Vector3f::new(0.0, -0.6, 0.8);
        assert!(guided.pdf(&wo, &toward) > guided.pdf(&wo, &away));
        assert!(approx_eq!(Float, guided.pdf(&wo, &away), 0.5 * bsdf.pdf(&wo, &away), epsilon = 0.05));
    }
}
