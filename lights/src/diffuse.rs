//! Diffuse Area Light Source

use rtcore::geometry::*;
use rtcore::interaction::*;
use rtcore::light::*;
use rtcore::pbrt::*;
use rtcore::shape::*;
use rtcore::spectrum::*;

/// Implements a diffuse area light source with uniform spatial and
/// directional radiance distribution.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Shape describing the surface of the light source.
    pub shape: ArcShape,

    /// Whether the light emits from both sides of the surface.
    pub two_sided: bool,

    /// Cached surface area.
    area: Float,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `l_emit`    - Emitted radiance.
    /// * `shape`     - Shape describing the surface of the light source.
    /// * `two_sided` - Whether the light emits from both sides of the surface.
    pub fn new(l_emit: Spectrum, shape: ArcShape, two_sided: bool) -> Result<Self, String> {
        let area = shape.area();
        if !(area > 0.0) {
            return Err(format!("Area light shape has invalid area {area}"));
        }
        Ok(Self {
            l_emit,
            shape,
            two_sided,
            area,
        })
    }

    /// Returns the radiance leaving a surface point with normal `n` in direction `w`.
    ///
    /// * `n` - Surface normal.
    /// * `w` - Outgoing direction.
    pub fn emitted(&self, n: &Normal3f, w: &Vector3f) -> Spectrum {
        if self.two_sided || n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::default()
        }
    }

    /// Converts the uniform area density to solid angle as seen from a point at distance `dist2`.
    ///
    /// * `dist2` - Squared distance to the light point.
    /// * `cos`   - Cosine between the light normal and the direction to the reference point.
    fn solid_angle_pdf(&self, dist2: Float, cos: Float) -> Float {
        let cos = abs(cos);
        if cos == 0.0 {
            0.0
        } else {
            dist2 / (cos * self.area)
        }
    }
}

impl Light for DiffuseAreaLight {
    fn get_type(&self) -> LightType {
        LightType::AREA_LIGHT
    }

    fn sample_direct(&self, p: &Point3f, u: &Point2f) -> Option<LightSample> {
        let (p_light, n_light) = self.shape.sample(u);
        let d = p_light - *p;
        let dist2 = d.length_squared();
        if dist2 == 0.0 {
            return None;
        }
        let dist = dist2.sqrt();
        let wi = d / dist;

        let value = self.emitted(&n_light, &-wi);
        let pdf = self.solid_angle_pdf(dist2, n_light.dot(&wi));
        if value.is_black() || pdf == 0.0 {
            return None;
        }
        Some(LightSample::new(wi, value, pdf, dist, false))
    }

    fn eval(&self, ref_p: &Point3f, si: &SurfaceInteraction) -> LightEval {
        let w = si.wo.normalize();
        let value = self.emitted(&si.n, &w);
        if value.is_black() {
            return LightEval::default();
        }
        let pdf = self.solid_angle_pdf(distance_squared(ref_p, &si.p), si.n.dot(&w));
        LightEval::new(value, pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use materials::*;
    use shapes::*;
    use std::sync::Arc;

    fn sphere_light() -> DiffuseAreaLight {
        let sphere = Sphere::new(Point3f::new(0.0, 0.0, 0.0), 1.0).unwrap();
        DiffuseAreaLight::new(Spectrum::new(3.0), Arc::new(sphere), false).unwrap()
    }

    #[test]
    fn sample_and_eval_agree() {
        let light = sphere_light();
        let p = Point3f::new(0.0, 0.0, 5.0);

        // This sample lands on the +z pole facing the reference point.
        let s = light.sample_direct(&p, &Point2f::new(0.0, 0.5)).unwrap();
        assert!(approx_eq!(Float, s.distance, 4.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, s.pdf, 16.0 / (4.0 * PI), epsilon = 1e-3));

        let si = SurfaceInteraction::new(
            Point3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            4.0,
            Arc::new(MatteMaterial::new(Spectrum::new(0.0))),
            None,
            None,
        );
        let e = light.eval(&p, &si);
        assert!(approx_eq!(Float, e.value[0], 3.0));
        assert!(approx_eq!(Float, e.pdf, s.pdf, epsilon = 1e-3));
    }

    #[test]
    fn back_side_is_dark() {
        let light = sphere_light();
        let si = SurfaceInteraction::new(
            Point3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, -1.0),
            1.0,
            Arc::new(MatteMaterial::new(Spectrum::new(0.0))),
            None,
            None,
        );
        assert!(light.eval(&Point3f::new(0.0, 0.0, 0.5), &si).value.is_black());
        assert!(DiffuseAreaLight::new(Spectrum::new(1.0), light.shape.clone(), true)
            .unwrap()
            .emitted(&si.n, &si.wo)
            .y()
            > 0.0);
    }
}
