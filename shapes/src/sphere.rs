//! Spheres

use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::sampling::*;
use rtcore::shape::*;

/// A sphere in world space.
#[derive(Copy, Clone, Debug)]
pub struct Sphere {
    /// Center.
    pub center: Point3f,

    /// Radius.
    pub radius: Float,
}

impl Sphere {
    /// Create a new `Sphere`.
    ///
    /// * `center` - Center.
    /// * `radius` - Radius.
    pub fn new(center: Point3f, radius: Float) -> Result<Self, String> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(format!("Invalid sphere radius {radius}"));
        }
        debug!("Sphere at {:?} with radius {}", center, radius);
        Ok(Self { center, radius })
    }

    /// Returns the ray parameters where the ray crosses the sphere, ordered near to far.
    ///
    /// * `ray` - The ray.
    fn solve(&self, ray: &Ray) -> Option<(Float, Float)> {
        // Solve |o + t·d - c|^2 = r^2 in double precision to keep grazing and distant hits stable.
        let oc = ray.o - self.center;
        let (ox, oy, oz) = (oc.x as f64, oc.y as f64, oc.z as f64);
        let (dx, dy, dz) = (ray.d.x as f64, ray.d.y as f64, ray.d.z as f64);
        let a = dx * dx + dy * dy + dz * dz;
        let b = 2.0 * (dx * ox + dy * oy + dz * oz);
        let c = ox * ox + oy * oy + oz * oz - (self.radius as f64) * (self.radius as f64);

        let discrim = b * b - 4.0 * a * c;
        if a == 0.0 || discrim < 0.0 {
            return None;
        }
        let root = discrim.sqrt();
        let q = if b < 0.0 { -0.5 * (b - root) } else { -0.5 * (b + root) };
        let (t0, t1) = if q == 0.0 { (0.0, 0.0) } else { (q / a, c / q) };
        let (t0, t1) = if t0 > t1 { (t1, t0) } else { (t0, t1) };
        Some((t0 as Float, t1 as Float))
    }
}

impl Shape for Sphere {
    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn area(&self) -> Float {
        FOUR_PI * self.radius * self.radius
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let (t0, t1) = self.solve(ray)?;
        let t = if t0 > 0.0 && t0 < ray.t_max {
            t0
        } else if t1 > 0.0 && t1 < ray.t_max {
            t1
        } else {
            return None;
        };

        let p = ray.at(t);
        let n = (p - self.center).normalize();
        // Project the hit point back onto the surface.
        let p = self.center + n * self.radius;
        Some(ShapeHit { t, p, n })
    }

    fn sample(&self, u: &Point2f) -> (Point3f, Normal3f) {
        let n = uniform_sample_sphere(u);
        (self.center + n * self.radius, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn hits_from_outside_and_inside() {
        let sphere = Sphere::new(Point3f::new(0.0, 0.0, -5.0), 1.0).unwrap();

        let ray = Ray::unbounded(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, hit.t, 4.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, hit.n.z, 1.0, epsilon = 1e-5));

        let inside = Ray::unbounded(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(1.0, 0.0, 0.0));
        let hit = sphere.intersect(&inside).unwrap();
        assert!(approx_eq!(Float, hit.t, 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, hit.n.x, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn misses_and_respects_t_max() {
        let sphere = Sphere::new(Point3f::new(0.0, 0.0, -5.0), 1.0).unwrap();
        let miss = Ray::unbounded(Point3f::new(0.0, 2.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&miss).is_none());

        let short = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0), 3.0, None);
        assert!(!sphere.intersect_p(&short));

        let behind = Ray::unbounded(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&behind).is_none());
    }

    #[test]
    fn invalid_radius() {
        assert!(Sphere::new(Point3f::new(0.0, 0.0, 0.0), 0.0).is_err());
        assert!(Sphere::new(Point3f::new(0.0, 0.0, 0.0), -1.0).is_err());
    }

    proptest! {
        #[test]
        fn samples_lie_on_surface(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let sphere = Sphere::new(Point3f::new(1.0, 2.0, 3.0), 2.0).unwrap();
            let (p, n) = sphere.sample(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, (p - sphere.center).length(), 2.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, n.length(), 1.0, epsilon = 1e-4));
        }
    }
}
