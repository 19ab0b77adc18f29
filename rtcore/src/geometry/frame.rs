//! Orthonormal Frames

use super::{Dot, Normal3f, Vector3f};
use crate::pbrt::Float;

/// Returns two vectors that together with `v` form an orthonormal basis. `v` must be normalized.
///
/// Uses the branchless construction of Duff et al. "Building an Orthonormal Basis, Revisited".
///
/// * `v` - The unit vector.
pub fn coordinate_system(v: &Vector3f) -> (Vector3f, Vector3f) {
    let sign = (1.0 as Float).copysign(v.z);
    let a = -1.0 / (sign + v.z);
    let b = v.x * v.y * a;
    (
        Vector3f::new(1.0 + sign * v.x * v.x * a, sign * b, -sign * v.x),
        Vector3f::new(b, sign + v.y * v.y * a, -v.y),
    )
}

/// A local shading frame whose z-axis is aligned with a unit normal.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// First tangent.
    pub s: Vector3f,

    /// Second tangent.
    pub t: Vector3f,

    /// The normal.
    pub n: Normal3f,
}

impl Frame {
    /// Create a frame around a unit normal.
    ///
    /// * `n` - The normal.
    pub fn from_normal(n: &Normal3f) -> Self {
        let (s, t) = coordinate_system(n);
        Self { s, t, n: *n }
    }

    /// Transform a world space vector into the frame.
    ///
    /// * `v` - World space vector.
    #[inline]
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Transform a vector in the frame into world space.
    ///
    /// * `v` - Local vector.
    #[inline]
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}
