//! Fresnel

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::mem::swap;

/// Returns the Fresnel reflection at the boundary between two dielectric media for unpolarized light.
///
/// * `cos_theta_i` - Cosine of the incident angle with respect to the normal on the side of `eta_i`.
/// * `eta_i`       - Index of refraction for medium that incident ray is in.
/// * `eta_t`       - Index of refraction for medium that incident ray is entering.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta_i = eta_i;
    let mut eta_t = eta_t;

    // Potentially swap indices of refraction.
    if cos_theta_i <= 0.0 {
        swap(&mut eta_i, &mut eta_t);
        cos_theta_i = abs(cos_theta_i);
    }

    // Snell's law.
    let sin_theta_i = safe_sqrt(1.0 - cos_theta_i * cos_theta_i);
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Total internal reflection.
    if sin_theta_t >= 1.0 {
        return 1.0;
    }

    let cos_theta_t = safe_sqrt(1.0 - sin_theta_t * sin_theta_t);
    let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t)) / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
    let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t)) / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Returns Schlick's approximation of conductor reflectance.
///
/// * `cos_theta_i` - Cosine of the angle between the incident direction and the microfacet normal.
/// * `r0`          - Reflectance at normal incidence.
pub fn fr_schlick(cos_theta_i: Float, r0: Spectrum) -> Spectrum {
    let m = clamp(1.0 - abs(cos_theta_i), 0.0, 1.0);
    let m5 = (m * m) * (m * m) * m;
    r0 + (Spectrum::new(1.0) - r0) * m5
}

/// Computes the refracted direction given an incident direction, a normal on the same side as `wi` and the
/// relative index of refraction `eta_i / eta_t`. Returns `None` on total internal reflection.
///
/// * `wi`  - Incident direction, pointing away from the surface.
/// * `n`   - Surface normal in the same hemisphere as `wi`.
/// * `eta` - Ratio of indices of refraction.
pub fn refract(wi: &Vector3f, n: &Normal3f, eta: Float) -> Option<Vector3f> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 {
        return None;
    }
    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(-*wi * eta + *n * (eta * cos_theta_i - cos_theta_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn normal_incidence_reflectance() {
        // ((1.5 - 1) / (1.5 + 1))^2
        assert!(approx_eq!(Float, fr_dielectric(1.0, 1.0, 1.5), 0.04, epsilon = 1e-6));
        assert!(approx_eq!(Float, fr_dielectric(-1.0, 1.0, 1.5), 0.04, epsilon = 1e-6));
    }

    #[test]
    fn total_internal_reflection() {
        let cos = 0.2;
        assert_eq!(fr_dielectric(-cos, 1.0, 1.5), 1.0);
        let wi = Vector3f::new((1.0 - cos * cos as Float).sqrt(), 0.0, cos);
        assert!(refract(&wi, &Normal3f::new(0.0, 0.0, 1.0), 1.5).is_none());
    }

    #[test]
    fn refraction_obeys_snell() {
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let wt = refract(&wi, &Normal3f::new(0.0, 0.0, 1.0), 1.0 / 1.5).unwrap();
        assert!(approx_eq!(Float, wt.length(), 1.0, epsilon = 1e-5));
        assert!(wt.z < 0.0);
        // sin_t = sin_i / 1.5
        assert!(approx_eq!(Float, -wt.x, 0.6 / 1.5, epsilon = 1e-5));
    }
}
