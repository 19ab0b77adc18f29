//! Reflection and surface scattering models

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;

mod bsdf;
mod bxdf_type;
mod fresnel;
mod microfacet;

// Re-export
pub use bsdf::*;
pub use bxdf_type::*;
pub use fresnel::*;
pub use microfacet::*;

/// Stores evaluation of BxDF samples.
#[derive(Copy, Clone, Debug, Default)]
pub struct BxDFSample {
    /// The sample value.
    pub f: Spectrum,

    /// The value of the PDF. Discrete probability for specular samples.
    pub pdf: Float,

    /// The sampled incident direction.
    pub wi: Vector3f,

    /// The type of lobe that was sampled.
    pub bxdf_type: BxDFType,
}

impl BxDFSample {
    /// Create a new `BxDFSample`.
    ///
    /// * `f`         - The sample value.
    /// * `pdf`       - The value of the PDF.
    /// * `wi`        - The sampled incident direction.
    /// * `bxdf_type` - The type of lobe that was sampled.
    pub fn new(f: Spectrum, pdf: Float, wi: Vector3f, bxdf_type: BxDFType) -> Self {
        Self { f, pdf, wi, bxdf_type }
    }

    /// Returns `true` if a specular lobe was sampled.
    pub fn is_specular(&self) -> bool {
        self.bxdf_type.contains(BxDFType::BSDF_SPECULAR)
    }
}

/// BxDF for BRDFs and BTDFs. Directions are expressed in the local shading frame where the normal is +z.
#[derive(Copy, Clone, Debug)]
pub enum BxDF {
    /// Ideal diffuse reflection.
    LambertianReflection {
        /// Reflectance.
        r: Spectrum,
    },

    /// Perfect mirror reflection without Fresnel falloff.
    SpecularReflection {
        /// Reflectance.
        r: Spectrum,
    },

    /// Fresnel-modulated specular reflection and transmission for dielectrics.
    FresnelSpecular {
        /// Spectrum used to scale the reflected colour.
        r: Spectrum,

        /// Spectrum used to scale the transmitted colour.
        t: Spectrum,

        /// Index of refraction above the surface (same side as surface normal).
        eta_a: Float,

        /// Index of refraction below the surface.
        eta_b: Float,
    },

    /// Torrance-Sparrow glossy reflection from a rough conductor.
    MicrofacetReflection {
        /// Reflectance at normal incidence.
        r: Spectrum,

        /// The microfacet distribution.
        distribution: TrowbridgeReitzDistribution,
    },
}

impl BxDF {
    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        match self {
            BxDF::LambertianReflection { .. } => BxDFType::BSDF_REFLECTION | BxDFType::BSDF_DIFFUSE,
            BxDF::SpecularReflection { .. } => BxDFType::BSDF_REFLECTION | BxDFType::BSDF_SPECULAR,
            BxDF::FresnelSpecular { .. } => {
                BxDFType::BSDF_REFLECTION | BxDFType::BSDF_TRANSMISSION | BxDFType::BSDF_SPECULAR
            }
            BxDF::MicrofacetReflection { .. } => BxDFType::BSDF_REFLECTION | BxDFType::BSDF_GLOSSY,
        }
    }

    /// Returns a scalar roughness in [0, 1]; 0 for delta distributions and 1 for diffuse.
    pub fn roughness(&self) -> Float {
        match self {
            BxDF::LambertianReflection { .. } => 1.0,
            BxDF::SpecularReflection { .. } | BxDF::FresnelSpecular { .. } => 0.0,
            BxDF::MicrofacetReflection { distribution, .. } => distribution.alpha,
        }
    }

    /// Returns the value of the distribution function for the given pair of directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        match self {
            BxDF::LambertianReflection { r } => {
                if same_hemisphere(wo, wi) {
                    *r * INV_PI
                } else {
                    Spectrum::default()
                }
            }
            // Delta distributions can't be hit by a direction chosen elsewhere.
            BxDF::SpecularReflection { .. } | BxDF::FresnelSpecular { .. } => Spectrum::default(),
            BxDF::MicrofacetReflection { r, distribution } => {
                let cos_theta_o = abs_cos_theta(wo);
                let cos_theta_i = abs_cos_theta(wi);
                let wh = *wi + *wo;
                if !same_hemisphere(wo, wi) || cos_theta_i == 0.0 || cos_theta_o == 0.0 || wh.is_zero() {
                    return Spectrum::default();
                }
                let wh = wh.normalize();
                let f = fr_schlick(wi.dot(&wh), *r);
                f * (distribution.d(&wh) * distribution.g(wo, wi) / (4.0 * cos_theta_i * cos_theta_o))
            }
        }
    }

    /// Evaluates the PDF of `sample_f()`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            BxDF::LambertianReflection { .. } => {
                if same_hemisphere(wo, wi) {
                    cosine_hemisphere_pdf(abs_cos_theta(wi))
                } else {
                    0.0
                }
            }
            BxDF::SpecularReflection { .. } | BxDF::FresnelSpecular { .. } => 0.0,
            BxDF::MicrofacetReflection { distribution, .. } => {
                let wh = *wo + *wi;
                if !same_hemisphere(wo, wi) || wh.is_zero() {
                    return 0.0;
                }
                let wh = wh.normalize();
                distribution.pdf(&wh) / (4.0 * abs(wo.dot(&wh)))
            }
        }
    }

    /// Samples an incident direction given the outgoing direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> Option<BxDFSample> {
        if wo.z == 0.0 {
            return None;
        }

        match self {
            BxDF::LambertianReflection { .. } => {
                let mut wi = cosine_sample_hemisphere(u);
                if wo.z < 0.0 {
                    wi.z *= -1.0;
                }
                let pdf = self.pdf(wo, &wi);
                Some(BxDFSample::new(self.f(wo, &wi), pdf, wi, self.get_type()))
            }
            BxDF::SpecularReflection { r } => {
                let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
                Some(BxDFSample::new(*r / abs_cos_theta(&wi), 1.0, wi, self.get_type()))
            }
            BxDF::FresnelSpecular { r, t, eta_a, eta_b } => {
                let f = fr_dielectric(cos_theta(wo), *eta_a, *eta_b);
                if u[0] < f {
                    let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
                    let sampled_type = BxDFType::BSDF_SPECULAR | BxDFType::BSDF_REFLECTION;
                    Some(BxDFSample::new(*r * f / abs_cos_theta(&wi), f, wi, sampled_type))
                } else {
                    let entering = cos_theta(wo) > 0.0;
                    let (eta_i, eta_t) = if entering { (*eta_a, *eta_b) } else { (*eta_b, *eta_a) };
                    let n = face_forward(&Normal3f::new(0.0, 0.0, 1.0), wo);
                    let wi = refract(wo, &n, eta_i / eta_t)?;

                    // Radiance is scaled when crossing into a medium with a different index of refraction.
                    let ft = *t * (1.0 - f) * (eta_i * eta_i) / (eta_t * eta_t);
                    let sampled_type = BxDFType::BSDF_SPECULAR | BxDFType::BSDF_TRANSMISSION;
                    Some(BxDFSample::new(ft / abs_cos_theta(&wi), 1.0 - f, wi, sampled_type))
                }
            }
            BxDF::MicrofacetReflection { distribution, .. } => {
                let wh = distribution.sample_wh(wo, u);
                let cos_o = wo.dot(&wh);
                if cos_o <= 0.0 {
                    return None;
                }
                let wi = -*wo + wh * (2.0 * cos_o);
                if !same_hemisphere(wo, &wi) {
                    return None;
                }
                let pdf = self.pdf(wo, &wi);
                Some(BxDFSample::new(self.f(wo, &wi), pdf, wi, self.get_type()))
            }
        }
    }
}

/// Returns cos(θ) for a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns |cos(θ)| for a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Returns `true` if two directions in the shading frame are in the same hemisphere.
///
/// * `w`  - First direction.
/// * `wp` - Second direction.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lambertian_sample_matches_pdf(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32, flip in proptest::bool::ANY) {
            let bxdf = BxDF::LambertianReflection { r: Spectrum::new(0.5) };
            let wo = Vector3f::new(0.2, 0.1, if flip { -0.8 } else { 0.8 }).normalize();
            if let Some(s) = bxdf.sample_f(&wo, &Point2f::new(u0, u1)) {
                prop_assert!(same_hemisphere(&wo, &s.wi) || s.pdf == 0.0);
                prop_assert!(approx_eq!(Float, s.pdf, bxdf.pdf(&wo, &s.wi), epsilon = 1e-6));
            }
        }

        #[test]
        fn microfacet_sample_matches_pdf(u0 in 0.0..0.999f32, u1 in 0.0..1.0f32, alpha in 0.05..1.0f32) {
            let bxdf = BxDF::MicrofacetReflection {
                r: Spectrum::new(0.8),
                distribution: TrowbridgeReitzDistribution::new(alpha),
            };
            let wo = Vector3f::new(0.4, -0.2, 0.7).normalize();
            if let Some(s) = bxdf.sample_f(&wo, &Point2f::new(u0, u1)) {
                prop_assert!(same_hemisphere(&wo, &s.wi));
                let pdf = bxdf.pdf(&wo, &s.wi);
                prop_assert!(approx_eq!(Float, s.pdf, pdf, epsilon = 1e-3 * max(1.0, pdf)));
                prop_assert!(!s.f.has_nans());
            }
        }

        #[test]
        fn fresnel_specular_conserves_energy(u0 in 0.0..1.0f32, cos in 0.05..1.0f32) {
            let bxdf = BxDF::FresnelSpecular {
                r: Spectrum::new(1.0),
                t: Spectrum::new(1.0),
                eta_a: 1.0,
                eta_b: 1.5,
            };
            let sin = (1.0 - cos * cos).sqrt();
            let wo = Vector3f::new(sin, 0.0, cos);
            if let Some(s) = bxdf.sample_f(&wo, &Point2f::new(u0, 0.5)) {
                prop_assert!(s.is_specular());
                prop_assert!(s.pdf > 0.0);
            }
        }
    }

    #[test]
    fn mirror_reflects_about_normal() {
        let bxdf = BxDF::SpecularReflection { r: Spectrum::new(0.9) };
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let s = bxdf.sample_f(&wo, &Point2f::new(0.5, 0.5)).unwrap();
        assert_eq!(s.wi, Vector3f::new(-0.6, 0.0, 0.8));
        assert!(s.is_specular());
        assert!(approx_eq!(Float, s.f[0] * abs_cos_theta(&s.wi), 0.9, epsilon = 1e-6));
        assert_eq!(bxdf.roughness(), 0.0);
    }

    #[test]
    fn rough_conductor_is_glossy() {
        let bxdf = BxDF::MicrofacetReflection {
            r: Spectrum::new(0.9),
            distribution: TrowbridgeReitzDistribution::new(0.2),
        };
        assert!(approx_eq!(Float, bxdf.roughness(), 0.2));
        assert!(!bxdf.get_type().contains(BxDFType::BSDF_SPECULAR));

        // The lobe peaks around the mirror direction.
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let mirror = Vector3f::new(-0.6, 0.0, 0.8);
        let off = Vector3f::new(0.6, 0.0, 0.8);
        assert!(bxdf.f(&wo, &mirror)[0] > 10.0 * bxdf.f(&wo, &off)[0]);
        assert!(bxdf.f(&wo, &-mirror).is_black());
    }

    #[test]
    fn lambertian_is_zero_across_hemispheres() {
        let bxdf = BxDF::LambertianReflection { r: Spectrum::new(1.0) };
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.0, -1.0);
        assert!(bxdf.f(&wo, &wi).is_black());
        assert_eq!(bxdf.pdf(&wo, &wi), 0.0);
    }
}
