//! 2-D Axis Aligned Bounding Boxes.

use super::{Point2, Point2i};
use crate::pbrt::{max, min, Int};
use itertools::{iproduct, Product};
use num_traits::Num;
use std::ops::Range;

/// 2D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bounds2<T> {
    /// Minimum bounds.
    pub p_min: Point2<T>,

    /// Maximum bounds.
    pub p_max: Point2<T>,
}

/// 2-D bounding box containing `Int` points.
pub type Bounds2i = Bounds2<Int>;

impl<T: Num + PartialOrd + Copy> Bounds2<T> {
    /// Creates a new 2-D bounding box from 2 points. The minimum and maximum bounds are used for each coordinate
    /// axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point2<T>, p2: Point2<T>) -> Self {
        Self {
            p_min: Point2::new(min(p1.x, p2.x), min(p1.y, p2.y)),
            p_max: Point2::new(max(p1.x, p2.x), max(p1.y, p2.y)),
        }
    }

    /// Returns true if the bounds describes an empty box where any of the minimum coordinates is greater than or
    /// equal to the maximum coordinates.
    pub fn is_empty(&self) -> bool {
        self.p_min.x >= self.p_max.x || self.p_min.y >= self.p_max.y
    }

    /// Returns the vector along the box diagonal from the minimum point to the maximum point.
    pub fn diagonal(&self) -> Point2<T> {
        self.p_max - self.p_min
    }

    /// Returns the area of the box.
    pub fn area(&self) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            let d = self.diagonal();
            d.x * d.y
        }
    }

    /// Returns the overlapping region of two bounding boxes.
    ///
    /// * `other` - The other bounding box.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            p_min: Point2::new(max(self.p_min.x, other.p_min.x), max(self.p_min.y, other.p_min.y)),
            p_max: Point2::new(min(self.p_max.x, other.p_max.x), min(self.p_max.y, other.p_max.y)),
        }
    }

    /// Returns true if a point is inside the box, excluding the upper bounds.
    ///
    /// * `p` - The point.
    pub fn contains_exclusive(&self, p: &Point2<T>) -> bool {
        p.x >= self.p_min.x && p.x < self.p_max.x && p.y >= self.p_min.y && p.y < self.p_max.y
    }
}

/// Iterator over the pixels of a `Bounds2i` in scanline order.
pub struct Bounds2iIterator {
    p: Product<Range<Int>, Range<Int>>,
}

impl IntoIterator for Bounds2i {
    type Item = Point2i;
    type IntoIter = Bounds2iIterator;

    /// Create an iterator for `Bounds2i`.
    fn into_iter(self) -> Self::IntoIter {
        let (max_x, max_y) = if self.is_empty() {
            (self.p_min.x, self.p_min.y)
        } else {
            (self.p_max.x, self.p_max.y)
        };
        Bounds2iIterator {
            p: iproduct!(self.p_min.y..max_y, self.p_min.x..max_x),
        }
    }
}

impl Iterator for Bounds2iIterator {
    type Item = Point2i;

    /// Get the next point.
    fn next(&mut self) -> Option<Self::Item> {
        self.p.next().map(|(y, x)| Point2i::new(x, y))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn area_of_empty_bounds2i_returns_zero() {
        let empty = Bounds2i::new(Point2i::new(3, 3), Point2i::new(3, 7));
        assert_eq!(empty.area(), 0);
        assert_eq!(empty.into_iter().count(), 0);
    }

    #[test]
    fn iterates_in_scanline_order() {
        let b = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 2));
        let pixels: Vec<Point2i> = b.into_iter().collect();
        assert_eq!(
            pixels,
            vec![Point2i::new(0, 0), Point2i::new(1, 0), Point2i::new(0, 1), Point2i::new(1, 1)]
        );
    }

    proptest! {
        #[test]
        fn iterator_count_matches_area(x0 in -20..20i32, y0 in -20..20i32, w in 0..16i32, h in 0..16i32) {
            let b = Bounds2i::new(Point2i::new(x0, y0), Point2i::new(x0 + w, y0 + h));
            prop_assert_eq!(b.into_iter().count() as i32, b.area());
            prop_assert!(b.into_iter().all(|p| b.contains_exclusive(&p)));
        }
    }
}
