//! Trowbridge-Reitz Distribution

use super::*;

/// Isotropic Trowbridge-Reitz (GGX) microfacet distribution.
#[derive(Copy, Clone, Debug)]
pub struct TrowbridgeReitzDistribution {
    /// Width of the distribution; α = sqrt(2) * σ where σ is the RMS slope of microfacets.
    pub alpha: Float,
}

impl TrowbridgeReitzDistribution {
    /// Create a new `TrowbridgeReitzDistribution`.
    ///
    /// * `alpha` - Width of the distribution.
    pub fn new(alpha: Float) -> Self {
        Self {
            alpha: max(0.001, alpha),
        }
    }

    /// Return the differential area of microfacets oriented with the surface normal `wh`.
    ///
    /// * `wh` - A sample normal from the distribution of normal vectors.
    pub fn d(&self, wh: &Vector3f) -> Float {
        let cos2_theta = wh.z * wh.z;
        if cos2_theta <= 0.0 {
            return 0.0;
        }
        let tan2_theta = max(0.0, 1.0 - cos2_theta) / cos2_theta;
        let alpha2 = self.alpha * self.alpha;
        let e = 1.0 + tan2_theta / alpha2;
        1.0 / (PI * alpha2 * cos2_theta * cos2_theta * e * e)
    }

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction.
    pub fn lambda(&self, w: &Vector3f) -> Float {
        let cos2_theta = w.z * w.z;
        if cos2_theta <= 0.0 {
            return 0.0;
        }
        let alpha2_tan2_theta = self.alpha * self.alpha * max(0.0, 1.0 - cos2_theta) / cos2_theta;
        (-1.0 + (1.0 + alpha2_tan2_theta).sqrt()) / 2.0
    }

    /// Returns the fraction of microfacets visible from both directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn g(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Samples a microfacet normal in the hemisphere of `wo` proportional to `D(wh)·|cosθh|`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_wh(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let phi = TWO_PI * u[1];
        let tan2_theta = self.alpha * self.alpha * u[0] / (1.0 - u[0]);
        let cos_theta = 1.0 / (1.0 + tan2_theta).sqrt();
        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let wh = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        if same_hemisphere(wo, &wh) {
            wh
        } else {
            -wh
        }
    }

    /// Returns the density of `sample_wh()`.
    ///
    /// * `wh` - The microfacet normal.
    pub fn pdf(&self, wh: &Vector3f) -> Float {
        self.d(wh) * abs_cos_theta(wh)
    }
}
