//! 3-D Axis Aligned Bounding Boxes.

use super::{Point3f, Vector3f};
use crate::pbrt::{Float, INFINITY};

/// 3D Axis Aligned Bounding Box with `Float` coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns an empty box.
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3f {
    /// Creates a new 3-D bounding box from 2 points.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns an empty box; the minimum is set to +∞ and maximum to -∞ so any union grows it.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }

    /// Returns true if no point has been added to the box.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns the vector along the box diagonal.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns a box that also contains the given point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns a box that contains both boxes.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns the radius of the sphere that bounds the box.
    pub fn bounding_radius(&self) -> Float {
        if self.is_empty() {
            0.0
        } else {
            self.diagonal().length() * 0.5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn union_grows_empty_box() {
        let b = Bounds3f::empty()
            .union_point(&Point3f::new(-1.0, 0.0, 2.0))
            .union_point(&Point3f::new(1.0, 2.0, 0.0));
        assert_eq!(b.p_min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 2.0, 2.0));
        assert!(approx_eq!(Float, b.bounding_radius(), 1.5, epsilon = 1e-6));
    }

    #[test]
    fn empty_radius_is_zero() {
        assert!(Bounds3f::empty().is_empty());
        assert_eq!(Bounds3f::default().bounding_radius(), 0.0);
    }
}
