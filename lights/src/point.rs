//! Point Light Source

use rtcore::geometry::*;
use rtcore::light::*;
use rtcore::pbrt::*;
use rtcore::spectrum::*;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position.
    /// * `intensity` - Intensity.
    pub fn new(p_light: Point3f, intensity: Spectrum) -> Self {
        debug!("Point light at {:?}", p_light);
        Self { p_light, intensity }
    }
}

impl Light for PointLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION_LIGHT
    }

    /// Returns the light arriving at `p` with inverse square falloff.
    ///
    /// * `p` - The reference point.
    /// * `_u` - Unused; the light has a single position.
    fn sample_direct(&self, p: &Point3f, _u: &Point2f) -> Option<LightSample> {
        let d = self.p_light - *p;
        let dist2 = d.length_squared();
        if dist2 == 0.0 {
            return None;
        }
        let dist = dist2.sqrt();
        let value = self.intensity / dist2;
        if value.is_black() {
            return None;
        }
        Some(LightSample::new(d / dist, value, 1.0, dist, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn inverse_square_falloff() {
        let light = PointLight::new(Point3f::new(0.0, 4.0, 0.0), Spectrum::new(32.0));
        assert!(light.is_delta_light());

        let s = light.sample_direct(&Point3f::new(0.0, 0.0, 0.0), &Point2f::new(0.3, 0.7)).unwrap();
        assert!(s.is_delta);
        assert_eq!(s.pdf, 1.0);
        assert!(approx_eq!(Float, s.distance, 4.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, s.value[0], 2.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, s.wi.y, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn coincident_point_has_no_sample() {
        let light = PointLight::new(Point3f::new(1.0, 1.0, 1.0), Spectrum::new(1.0));
        assert!(light.sample_direct(&Point3f::new(1.0, 1.0, 1.0), &Point2f::new(0.5, 0.5)).is_none());
    }
}
