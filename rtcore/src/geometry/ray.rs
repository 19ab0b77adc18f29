//! Rays

use super::{Point3f, Vector3f};
use crate::medium::ArcMedium;
use crate::pbrt::{Float, INFINITY};
use std::fmt;

/// A Ray
#[derive(Clone)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Medium containing the origin.
    pub medium: Option<ArcMedium>,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o`      - Origin.
    /// * `d`      - Direction.
    /// * `t_max`  - Maximum extent of the ray.
    /// * `medium` - Medium containing origin `o`.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, medium: Option<ArcMedium>) -> Self {
        Self { o, d, t_max, medium }
    }

    /// Returns an unbounded ray that is not inside any medium.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn unbounded(o: Point3f, d: Vector3f) -> Self {
        Self::new(o, d, INFINITY, None)
    }

    /// Returns the point along the ray at a given parameter.
    ///
    /// * `t` - The parameter.
    #[inline]
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl fmt::Debug for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ray")
            .field("o", &self.o)
            .field("d", &self.d)
            .field("t_max", &self.t_max)
            .field("has_medium", &self.medium.is_some())
            .finish()
    }
}
