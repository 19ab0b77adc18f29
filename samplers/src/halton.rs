//! Halton Sampler.

use rtcore::geometry::*;
use rtcore::low_discrepancy::*;
use rtcore::pbrt::*;
use rtcore::rng::*;
use rtcore::sampler::*;
use std::sync::Arc;

/// Maximum resolution for sampling first 2 dimensions.
const K_MAX_RESOLUTION: Int = 128;

/// Number of scrambled dimensions in the default permutation table.
pub const DEFAULT_HALTON_DIMENSIONS: usize = 256;

/// Implements a low-discrepancy sampler using Halton sequences. Dimensions past the end of the permutation table
/// fall back to uniform random numbers.
pub struct HaltonSampler {
    /// The sampler data.
    data: SamplerData,

    /// Digit permutations shared by all clones.
    permutations: Arc<PermutationTable>,

    /// Sample bounds.
    sample_bounds: Bounds2i,

    /// The scale factors `2^j` and `3^k`.
    base_scales: [u64; 2],

    /// The exponents `j` and `k` used to compute the scale factors in `base_scales`.
    base_exponents: [u64; 2],

    /// Stores the product `2^j * 3^k`. Each pixel in the range (0, 0) -> (2^j - 1, 3^k - 1) is visited once per
    /// `sample_stride` samples.
    sample_stride: u64,

    /// Multiplicative inverses for `base_scales`.
    mult_inverse: [u64; 2],

    /// Pixel for the current offset.
    pixel_for_offset: Point2i,

    /// Index of the first Halton sample for `pixel_for_offset`.
    offset_for_current_pixel: u64,

    /// Global index of the current sample vector.
    interval_sample_index: u64,

    /// Next dimension of the current sample vector.
    dimension: usize,

    /// Generates values for dimensions beyond the permutation table.
    rng: RNG,
}

impl HaltonSampler {
    /// Create a new `HaltonSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples per pixel.
    /// * `sample_bounds`     - Sample bounds.
    /// * `permutations`      - Digit permutations for scrambling.
    pub fn new(samples_per_pixel: usize, sample_bounds: Bounds2i, permutations: Arc<PermutationTable>) -> Self {
        // Find base scales and exponents that cover the sampling area.
        let res = sample_bounds.diagonal();
        let mut base_scales = [1_u64; 2];
        let mut base_exponents = [0_u64; 2];
        for (i, base) in [2_u64, 3_u64].into_iter().enumerate() {
            while (base_scales[i] as Int) < min(res[i], K_MAX_RESOLUTION) {
                base_scales[i] *= base;
                base_exponents[i] += 1;
            }
        }

        let sample_stride = base_scales[0] * base_scales[1];
        let mult_inverse = [
            multiplicative_inverse(base_scales[1] as i64, base_scales[0] as i64),
            multiplicative_inverse(base_scales[0] as i64, base_scales[1] as i64),
        ];

        Self {
            data: SamplerData::new(samples_per_pixel),
            permutations,
            sample_bounds,
            base_scales,
            base_exponents,
            sample_stride,
            mult_inverse,
            pixel_for_offset: Point2i::new(Int::MAX, Int::MAX),
            offset_for_current_pixel: 0,
            interval_sample_index: 0,
            dimension: 0,
            rng: RNG::default(),
        }
    }

    /// Build the default permutation table.
    pub fn default_permutations() -> Arc<PermutationTable> {
        let mut rng = RNG::default();
        Arc::new(PermutationTable::new(DEFAULT_HALTON_DIMENSIONS, &mut rng))
    }

    /// Maps the current pixel and a sample number to a global index into the Halton sequence.
    ///
    /// * `sample_num` - The sample number.
    fn get_index_for_sample(&mut self, sample_num: usize) -> u64 {
        if self.data.current_pixel != self.pixel_for_offset {
            self.offset_for_current_pixel = 0;
            if self.sample_stride > 1 {
                let pm = [
                    (self.data.current_pixel.x - self.sample_bounds.p_min.x).rem_euclid(K_MAX_RESOLUTION),
                    (self.data.current_pixel.y - self.sample_bounds.p_min.y).rem_euclid(K_MAX_RESOLUTION),
                ];
                for (i, base) in [2_u64, 3_u64].into_iter().enumerate() {
                    let dim_offset = inverse_radical_inverse(base, pm[i] as u64, self.base_exponents[i]);
                    let offset = dim_offset * (self.sample_stride / self.base_scales[i]) * self.mult_inverse[i];
                    self.offset_for_current_pixel += offset;
                }
                self.offset_for_current_pixel %= self.sample_stride;
            }
            self.pixel_for_offset = self.data.current_pixel;
        }

        self.offset_for_current_pixel + sample_num as u64 * self.sample_stride
    }

    /// Returns the sample value for the given dimension of the index^th sample vector in the sequence.
    ///
    /// * `index` - Index of the sample.
    /// * `dim`   - Dimension.
    fn sample_dimension(&mut self, index: u64, dim: usize) -> Float {
        match dim {
            0 => radical_inverse(2, index >> self.base_exponents[0]),
            1 => radical_inverse(3, index / self.base_scales[1]),
            d if d < self.permutations.dimensions() => self.permutations.scrambled_radical_inverse(d, index),
            _ => self.rng.uniform_float(),
        }
    }
}

impl Sampler for HaltonSampler {
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Clones share the permutation table. The seed only affects dimensions beyond the table.
    ///
    /// * `seed` - The seed for the fallback random number generator.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        let mut sampler = Self::new(
            self.data.samples_per_pixel,
            self.sample_bounds,
            Arc::clone(&self.permutations),
        );
        sampler.rng.set_sequence(seed);
        Box::new(sampler)
    }

    fn start_pixel(&mut self, p: &Point2i) {
        self.data.start_pixel(p);
        self.dimension = 0;
        self.interval_sample_index = self.get_index_for_sample(0);
    }

    fn get_1d(&mut self) -> Float {
        let p = self.sample_dimension(self.interval_sample_index, self.dimension);
        self.dimension += 1;
        p
    }

    fn get_2d(&mut self) -> Point2f {
        let x = self.sample_dimension(self.interval_sample_index, self.dimension);
        let y = self.sample_dimension(self.interval_sample_index, self.dimension + 1);
        self.dimension += 2;
        Point2f::new(x, y)
    }

    fn start_next_sample(&mut self) -> bool {
        self.dimension = 0;
        self.interval_sample_index = self.get_index_for_sample(self.data.current_pixel_sample_index + 1);
        self.data.start_next_sample()
    }

    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.dimension = 0;
        self.interval_sample_index = self.get_index_for_sample(sample_num);
        self.data.set_sample_number(sample_num)
    }
}

/// Returns `(x, y)` such that `a·x + b·y = gcd(a, b)`.
///
/// * `a` - First number.
/// * `b` - Second number.
fn extended_gcd(a: u64, b: u64) -> (i64, i64) {
    if b == 0 {
        (1, 0)
    } else {
        let d = (a / b) as i64;
        let (xp, yp) = extended_gcd(b, a % b);
        (yp, xp - (d * yp))
    }
}

/// Calculate the multiplicative inverse `b` of `a` with respect to modulus `n` such that `(a * b) mod n = 1`.
///
/// * `a` - Number.
/// * `n` - Modulus.
fn multiplicative_inverse(a: i64, n: i64) -> u64 {
    let (x, _y) = extended_gcd(a as u64, n as u64);
    x.rem_euclid(n) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: Int, y: Int) -> Bounds2i {
        Bounds2i::new(Point2i::new(0, 0), Point2i::new(x, y))
    }

    #[test]
    fn multiplicative_inverses() {
        assert_eq!(multiplicative_inverse(3, 8), 3);
        assert_eq!(multiplicative_inverse(8, 9), 8);
        assert_eq!((27 * multiplicative_inverse(27, 64)) % 64, 1);
    }

    #[test]
    fn first_dimensions_stratify_pixel() {
        let table = HaltonSampler::default_permutations();
        let mut sampler = HaltonSampler::new(16, bounds(16, 16), table);
        let pixel = Point2i::new(5, 9);
        sampler.start_pixel(&pixel);
        for i in 0..16 {
            sampler.set_sample_number(i);
            let cs = sampler.get_camera_sample(&pixel);
            assert!(cs.p_film.x >= 5.0 && cs.p_film.x < 6.0);
            assert!(cs.p_film.y >= 9.0 && cs.p_film.y < 10.0);
        }
    }

    #[test]
    fn clones_share_table_and_sequence() {
        let table = HaltonSampler::default_permutations();
        let prototype = HaltonSampler::new(4, bounds(8, 8), Arc::clone(&table));
        let mut a = prototype.clone_sampler(1);
        let mut b = prototype.clone_sampler(2);
        assert_eq!(Arc::strong_count(&table), 4);

        let pixel = Point2i::new(1, 2);
        a.start_pixel(&pixel);
        b.start_pixel(&pixel);
        for _ in 0..8 {
            assert_eq!(a.get_1d(), b.get_1d());
        }
    }

    #[test]
    fn dimensions_beyond_table_use_rng() {
        let mut rng = RNG::default();
        let table = Arc::new(PermutationTable::new(3, &mut rng));
        let mut sampler = HaltonSampler::new(1, bounds(4, 4), table);
        sampler.start_pixel(&Point2i::new(0, 0));
        for _ in 0..10 {
            let u = sampler.get_1d();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
