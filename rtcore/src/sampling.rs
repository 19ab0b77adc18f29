//! Sampling

use crate::geometry::*;
use crate::pbrt::*;

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let ox = 2.0 * u.x - 1.0;
    let oy = 2.0 * u.y - 1.0;

    // Handle degeneracy at the origin.
    if ox == 0.0 && oy == 0.0 {
        return Point2f::default();
    }

    let (r, theta) = if abs(ox) > abs(oy) {
        (ox, PI_OVER_FOUR * (oy / ox))
    } else {
        (oy, PI_OVER_TWO - PI_OVER_FOUR * (ox / oy))
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Cosine-weighted sample of the hemisphere around `(0, 0, 1)` (Malley's method).
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = safe_sqrt(1.0 - d.x * d.x - d.y * d.y);
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted hemisphere sampling.
///
/// * `cos_theta` - Cosine of the angle with the hemisphere axis.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Uniformly sample a direction from a sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Weight samples using the power heuristic with an arbitrary exponent, assuming one sample from each strategy.
///
/// A pdf of `∞` comes from a strategy no other technique can produce (e.g. the camera ray) and gets full weight.
///
/// * `f_pdf` - Pdf of the strategy that generated the sample.
/// * `g_pdf` - Pdf of the competing strategy.
/// * `beta`  - Exponent; `1` gives the balance heuristic and `2` the classic power heuristic.
#[inline]
pub fn mis_weight(f_pdf: Float, g_pdf: Float, beta: Float) -> Float {
    if f_pdf.is_infinite() {
        return 1.0;
    }
    let f = f_pdf.powf(beta);
    let g = g_pdf.powf(beta);
    if f + g <= 0.0 {
        0.0
    } else {
        f / (f + g)
    }
}

/// Weight samples using the power heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    mis_weight(nf as Float * f_pdf, ng as Float * g_pdf, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mis_weights_sum_to_one(a in 1e-3..1e3f32, b in 1e-3..1e3f32, beta in 1.0..3.0f32) {
            let w = mis_weight(a, b, beta) + mis_weight(b, a, beta);
            prop_assert!(approx_eq!(Float, w, 1.0, epsilon = 1e-5));
        }

        #[test]
        fn cosine_samples_in_upper_hemisphere(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(u0, u1));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn sphere_samples_are_unit(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let w = uniform_sample_sphere(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }
    }

    #[test]
    fn infinite_pdf_gets_full_weight() {
        assert_eq!(mis_weight(INFINITY, 10.0, 1.0), 1.0);
        assert_eq!(mis_weight(0.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn classic_power_heuristic() {
        assert!(approx_eq!(Float, power_heuristic(1, 1.0, 1, 1.0), 0.5, epsilon = 1e-6));
        assert!(approx_eq!(Float, power_heuristic(1, 2.0, 1, 1.0), 0.8, epsilon = 1e-6));
    }
}
