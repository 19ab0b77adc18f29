//! Uniform Infinite Light Source

use rtcore::geometry::*;
use rtcore::light::*;
use rtcore::pbrt::*;
use rtcore::sampling::*;
use rtcore::spectrum::*;

/// Implements a constant environment surrounding the whole scene.
#[derive(Clone)]
pub struct UniformInfiniteLight {
    /// Emitted radiance.
    pub l: Spectrum,
}

impl UniformInfiniteLight {
    /// Returns a new `UniformInfiniteLight`.
    ///
    /// * `l` - Emitted radiance.
    pub fn new(l: Spectrum) -> Self {
        Self { l }
    }
}

impl Light for UniformInfiniteLight {
    fn get_type(&self) -> LightType {
        LightType::INFINITE_LIGHT
    }

    fn sample_direct(&self, _p: &Point3f, u: &Point2f) -> Option<LightSample> {
        if self.l.is_black() {
            return None;
        }
        let wi = uniform_sample_sphere(u);
        Some(LightSample::new(wi, self.l, uniform_sphere_pdf(), INFINITY, false))
    }

    fn eval_environment(&self, _ray: &Ray) -> LightEval {
        LightEval::new(self.l, uniform_sphere_pdf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn samples_match_evaluation(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let light = UniformInfiniteLight::new(Spectrum::new(0.25));
            let s = light.sample_direct(&Point3f::zero(), &Point2f::new(u0, u1)).unwrap();
            prop_assert!(s.distance.is_infinite());
            prop_assert!(!s.is_delta);

            let e = light.eval_environment(&Ray::unbounded(Point3f::zero(), s.wi));
            prop_assert!(approx_eq!(Float, e.pdf, s.pdf));
            prop_assert!(approx_eq!(Float, e.value[2], 0.25));
        }
    }
}
