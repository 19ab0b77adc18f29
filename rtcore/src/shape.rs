//! Shapes

use crate::geometry::*;
use crate::pbrt::*;
use std::sync::Arc;

/// Geometric information about a ray-shape intersection.
#[derive(Copy, Clone, Debug)]
pub struct ShapeHit {
    /// Parametric distance along the ray.
    pub t: Float,

    /// Hit point.
    pub p: Point3f,

    /// Outward facing unit normal.
    pub n: Normal3f,
}

/// Shape interface.
pub trait Shape {
    /// Returns the world space bounding box.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the surface area.
    fn area(&self) -> Float;

    /// Returns the closest intersection in `(0, ray.t_max)`.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    /// Returns `true` if the ray intersects the shape in `(0, ray.t_max)`.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Samples a point uniformly by area. Returns the point and its outward normal.
    ///
    /// * `u` - Sample value in [0, 1)^2.
    fn sample(&self, u: &Point2f) -> (Point3f, Normal3f);
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape + Send + Sync>;
