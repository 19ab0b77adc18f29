//! Geometry

mod bounds2;
mod bounds3;
mod frame;
mod point2;
mod ray;
mod vector3;

// Re-export
pub use bounds2::*;
pub use bounds3::*;
pub use frame::*;
pub use point2::*;
pub use ray::*;
pub use vector3::*;

/// Interface for computing the dot product.
pub trait Dot<T> {
    type Output;

    /// Returns the dot product.
    ///
    /// * `other` - The other value.
    fn dot(&self, other: &T) -> Self::Output;

    /// Returns the absolute value of the dot product.
    ///
    /// * `other` - The other value.
    fn abs_dot(&self, other: &T) -> Self::Output;
}

/// Returns the dot product of two values.
///
/// * `a` - First value.
/// * `b` - Second value.
#[inline(always)]
pub fn dot<T, U: Dot<T>>(a: &U, b: &T) -> U::Output {
    a.dot(b)
}

/// Returns the absolute value of the dot product of two values.
///
/// * `a` - First value.
/// * `b` - Second value.
#[inline(always)]
pub fn abs_dot<T, U: Dot<T>>(a: &U, b: &T) -> U::Output {
    a.abs_dot(b)
}

/// Flips `n` so it lies in the same hemisphere as `v`.
///
/// * `n` - The normal.
/// * `v` - The reference vector.
#[inline(always)]
pub fn face_forward(n: &Normal3f, v: &Vector3f) -> Normal3f {
    if n.dot(v) < 0.0 {
        -*n
    } else {
        *n
    }
}

/// Returns the distance between two points.
///
/// * `p1` - The first point.
/// * `p2` - The second point.
#[inline(always)]
pub fn distance(p1: &Point3f, p2: &Point3f) -> crate::pbrt::Float {
    (*p1 - *p2).length()
}

/// Returns the squared distance between two points.
///
/// * `p1` - The first point.
/// * `p2` - The second point.
#[inline(always)]
pub fn distance_squared(p1: &Point3f, p2: &Point3f) -> crate::pbrt::Float {
    (*p1 - *p2).length_squared()
}
