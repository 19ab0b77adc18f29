//! RGB Spectrum.

use crate::pbrt::*;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub};

/// Number of spectral samples to use for `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// Luminance weights for linear sRGB primaries.
const Y_WEIGHT: [Float; 3] = [0.212671, 0.715160, 0.072169];

/// RGBSpectrum represents an spectral power distribution (SPD) with
/// a weighted sum of red, green and blue components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RGBSpectrum {
    /// The sampled spectral values.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Create a new `RGBSpectrum` with a constant value across all
    /// wavelengths.
    ///
    /// * `v` - Constant value.
    pub fn new(v: Float) -> Self {
        Self { c: [v; RGB_SAMPLES] }
    }

    /// Create a new `RGBSpectrum` from red, green and blue components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB components.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns true if the SPD is zero everywhere.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns true if any of the components is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if any of the components is infinite.
    pub fn has_infs(&self) -> bool {
        self.c.iter().any(|v| v.is_infinite())
    }

    /// Returns true if any of the components is negative.
    pub fn has_negatives(&self) -> bool {
        self.c.iter().any(|v| *v < 0.0)
    }

    /// Returns the luminance.
    pub fn y(&self) -> Float {
        Y_WEIGHT[0] * self.c[0] + Y_WEIGHT[1] * self.c[1] + Y_WEIGHT[2] * self.c[2]
    }

    /// Returns the arithmetic mean of the components.
    pub fn average(&self) -> Float {
        self.c.iter().sum::<Float>() / RGB_SAMPLES as Float
    }

    /// Returns the largest component value.
    pub fn max_component_value(&self) -> Float {
        self.c.iter().fold(-INFINITY, |a, b| max(a, *b))
    }

    /// Returns `e^c` for each component.
    pub fn exp(&self) -> Self {
        Self {
            c: [self.c[0].exp(), self.c[1].exp(), self.c[2].exp()],
        }
    }
}

impl Default for RGBSpectrum {
    /// Return a black `RGBSpectrum`.
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl From<Float> for RGBSpectrum {
    /// Create a constant `RGBSpectrum`.
    ///
    /// * `v` - Constant value.
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] + other.c[0], self.c[1] + other.c[1], self.c[2] + other.c[2]],
        }
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] - other.c[0], self.c[1] - other.c[1], self.c[2] - other.c[2]],
        }
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] * other.c[0], self.c[1] * other.c[1], self.c[2] * other.c[2]],
        }
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, f: Float) -> Self::Output {
        Self {
            c: [self.c[0] * f, self.c[1] * f, self.c[2] * f],
        }
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        self * inv
    }
}

impl DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn black_detection() {
        assert!(RGBSpectrum::default().is_black());
        assert!(!RGBSpectrum::from_rgb(0.0, 1e-6, 0.0).is_black());
    }

    #[test]
    fn degenerate_values() {
        assert!(RGBSpectrum::from_rgb(Float::NAN, 0.0, 0.0).has_nans());
        assert!(RGBSpectrum::from_rgb(0.0, INFINITY, 0.0).has_infs());
        assert!(RGBSpectrum::from_rgb(0.0, 0.0, -1.0).has_negatives());
    }

    #[test]
    fn luminance_of_white_is_one() {
        assert!(approx_eq!(Float, RGBSpectrum::new(1.0).y(), 1.0, epsilon = 1e-5));
    }

    proptest! {
        #[test]
        fn average_and_max(r in 0.0..10.0f32, g in 0.0..10.0f32, b in 0.0..10.0f32) {
            let s = RGBSpectrum::from_rgb(r, g, b);
            prop_assert!(approx_eq!(Float, s.average(), (r + g + b) / 3.0, epsilon = 1e-5));
            prop_assert_eq!(s.max_component_value(), r.max(g).max(b));
        }
    }
}
