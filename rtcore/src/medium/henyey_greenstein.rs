//! Henyey-Greenstein

use crate::geometry::*;
use crate::pbrt::*;

/// Henyey-Greenstein phase function.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HenyeyGreenstein {
    /// The asymmetry parameter. Isotropic phase functions use g = 0.
    pub g: Float,
}

impl HenyeyGreenstein {
    /// Returns a new `HenyeyGreenstein`.
    ///
    /// * `g` - The asymmetry parameter in (-1, 1).
    pub fn new(g: Float) -> Self {
        Self { g: clamp(g, -0.99, 0.99) }
    }

    /// Returns the value of the phase function for the given pair of directions. Both directions point away from
    /// the scattering point.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn p(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        phase_hg(wo.dot(wi), self.g)
    }

    /// Returns the phase function value, which is also the pdf, and a sampled incident direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample_p(&self, wo: &Vector3f, u: &Point2f) -> (Float, Vector3f) {
        let g = self.g;
        let cos_theta = if abs(g) < 1e-3 {
            1.0 - 2.0 * u[0]
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 + g - 2.0 * g * u[0]);
            -(1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };
        let cos_theta = clamp(cos_theta, -1.0, 1.0);

        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let phi = TWO_PI * u[1];
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        let wi = Frame::from_normal(wo).to_world(&local);

        (phase_hg(cos_theta, g), wi)
    }
}

/// Computes the Henyey-Greenstein phase function.
///
/// * `cos_theta` - Cosine of the angle between the two directions.
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * denom.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn isotropic_is_constant() {
        let hg = HenyeyGreenstein::new(0.0);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(1.0, 0.0, 0.0);
        assert!(approx_eq!(Float, hg.p(&wo, &wi), INV_FOUR_PI, epsilon = 1e-7));
    }

    #[test]
    fn forward_scattering_peaks_opposite_wo() {
        let hg = HenyeyGreenstein::new(0.7);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        assert!(hg.p(&wo, &-wo) > hg.p(&wo, &wo));
    }

    proptest! {
        #[test]
        fn sampled_value_matches_evaluation(g in -0.9..0.9f32, u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let hg = HenyeyGreenstein::new(g);
            let wo = Vector3f::new(0.3, -0.4, 0.5).normalize();
            let (pdf, wi) = hg.sample_p(&wo, &Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, wi.length(), 1.0, epsilon = 1e-4));
            let p = hg.p(&wo, &wi);
            prop_assert!((pdf - p).abs() <= 1e-2 * p.max(1.0));
        }
    }
}
