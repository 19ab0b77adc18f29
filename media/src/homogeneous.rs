//! Homogeneous Medium

use rtcore::geometry::*;
use rtcore::medium::*;
use rtcore::pbrt::*;
use rtcore::sampler::*;
use rtcore::spectrum::*;

/// Implements a homogeneous medium representing a region of space with constant
/// σa and σs values throughout its extent.
pub struct HomogeneousMedium {
    /// Scattering coefficient `σs` is the probability of an out-scattering
    /// event occurring per unit distance
    sigma_s: Spectrum,

    /// Total reduction in radiance due to absorption and out-scattering
    /// `σt = σs + σa`. This combined effect of absorption and out-scattering is
    /// called attenuation or extinction.
    sigma_t: Spectrum,

    /// The asymmetry parameter for Henyey-Greenstein phase function.
    g: Float,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium `.
    ///
    /// * `sigma_a` - Absorption cross section `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    /// * `g`       - The asymmetry parameter for Henyey-Greenstein phase
    ///               function.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, g: Float) -> Result<Self, String> {
        if sigma_a.has_negatives() || sigma_s.has_negatives() {
            return Err(String::from("Medium coefficients must not be negative"));
        }
        debug!("Homogeneous medium σa={:?} σs={:?} g={}", sigma_a, sigma_s, g);
        Ok(Self {
            sigma_s,
            sigma_t: sigma_s + sigma_a,
            g,
        })
    }

    /// Returns `exp(-σt·d)` for a world space distance `d`.
    ///
    /// * `d` - The distance.
    fn transmittance(&self, d: Float) -> Spectrum {
        (self.sigma_t * -min(d, Float::MAX)).exp()
    }
}

impl Medium for HomogeneousMedium {
    fn eval_transmittance(&self, ray: &Ray, _sampler: &mut dyn Sampler) -> Spectrum {
        self.transmittance(ray.t_max * ray.d.length())
    }

    /// Samples a scattering distance along a world-space ray.
    ///
    /// The ray will generally have been intersected against the scene geometry;
    /// no event is ever sampled beyond its `t_max` value.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample_distance(&self, ray: &Ray, sampler: &mut dyn Sampler) -> MediumSample {
        // Sample a channel and distance along the ray.
        let channel = min(
            (sampler.get_1d() * SPECTRUM_SAMPLES as Float) as usize,
            SPECTRUM_SAMPLES - 1,
        );
        let d_len = ray.d.length();
        let dist = -(1.0 - sampler.get_1d()).ln() / self.sigma_t[channel];
        let t = min(dist / d_len, ray.t_max);
        let sampled_medium = t < ray.t_max;

        // Compute the transmittance and sampling density
        let tr = self.transmittance(t * d_len);
        let density = if sampled_medium { self.sigma_t * tr } else { tr };

        let mut pdf = 0.0;
        for i in 0..SPECTRUM_SAMPLES {
            pdf += density[i];
        }
        pdf *= 1.0 / SPECTRUM_SAMPLES as Float;
        if pdf == 0.0 {
            pdf = 1.0;
        }

        if sampled_medium {
            MediumSample::scattered(t, tr * self.sigma_s / pdf)
        } else {
            MediumSample::passed(tr / pdf)
        }
    }

    fn phase(&self) -> HenyeyGreenstein {
        HenyeyGreenstein::new(self.g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use samplers::*;

    fn fog() -> HomogeneousMedium {
        HomogeneousMedium::new(Spectrum::new(0.5), Spectrum::new(0.5), 0.0).unwrap()
    }

    #[test]
    fn beer_lambert_transmittance() {
        let mut sampler = RandomSampler::new(1, Some(7));
        let ray = Ray::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 2.0), 1.5, None);
        let tr = fog().eval_transmittance(&ray, &mut sampler);
        assert!(approx_eq!(Float, tr[0], (-3.0 as Float).exp(), epsilon = 1e-6));

        let escaping = Ray::unbounded(Point3f::zero(), Vector3f::new(1.0, 0.0, 0.0));
        assert!(fog().eval_transmittance(&escaping, &mut sampler).is_black());
    }

    #[test]
    fn scattering_weight_is_albedo() {
        let medium = fog();
        let mut sampler = RandomSampler::new(1, Some(11));
        let ray = Ray::unbounded(Point3f::zero(), Vector3f::new(0.0, 1.0, 0.0));
        for _ in 0..100 {
            let s = medium.sample_distance(&ray, &mut sampler);
            assert!(s.is_scattered());
            assert!(approx_eq!(Float, s.weight[1], 0.5, epsilon = 1e-5));
        }
    }

    #[test]
    fn pass_through_estimates_transmittance() {
        let medium = fog();
        let mut sampler = RandomSampler::new(1, Some(3));
        let ray = Ray::new(Point3f::zero(), Vector3f::new(1.0, 0.0, 0.0), 1.0, None);

        let n = 20000;
        let mut sum = 0.0;
        for _ in 0..n {
            let s = medium.sample_distance(&ray, &mut sampler);
            if !s.is_scattered() {
                sum += s.weight[0];
            }
        }
        let estimate = sum / n as Float;
        assert!(approx_eq!(Float, estimate, (-1.0 as Float).exp(), epsilon = 0.02));
    }

    #[test]
    fn clear_medium_never_scatters() {
        let clear = HomogeneousMedium::new(Spectrum::new(0.0), Spectrum::new(0.0), 0.0).unwrap();
        let mut sampler = RandomSampler::new(1, Some(5));
        let ray = Ray::unbounded(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0));
        let s = clear.sample_distance(&ray, &mut sampler);
        assert!(!s.is_scattered());
        assert!(approx_eq!(Float, s.weight[0], 1.0));
        assert!(HomogeneousMedium::new(Spectrum::new(-1.0), Spectrum::new(0.0), 0.0).is_err());
    }
}
