//! Low Discrepancy Sequences

use crate::pbrt::*;
use crate::rng::*;

/// Returns the first `n` prime numbers.
///
/// * `n` - Number of primes.
pub fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate = 2_u64;
    while primes.len() < n {
        if primes.iter().take_while(|p| *p * *p <= candidate).all(|p| candidate % p != 0) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Computes the radical inverse of `a` in the given prime base, mirroring its digits about the decimal point.
///
/// * `base` - The base.
/// * `a`    - The integer.
pub fn radical_inverse(base: u64, mut a: u64) -> Float {
    let inv_base = 1.0 / base as f64;
    let mut reversed_digits = 0_u64;
    let mut inv_base_n = 1.0_f64;
    while a > 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    min((reversed_digits as f64 * inv_base_n) as Float, ONE_MINUS_EPSILON)
}

/// Inverts `radical_inverse()` for a value with a known number of digits.
///
/// * `base`     - The base.
/// * `inverse`  - The reversed digits.
/// * `n_digits` - Number of digits.
pub fn inverse_radical_inverse(base: u64, mut inverse: u64, n_digits: u64) -> u64 {
    let mut index = 0_u64;
    for _ in 0..n_digits {
        let digit = inverse % base;
        inverse /= base;
        index = index * base + digit;
    }
    index
}

/// Immutable table of random digit permutations used to scramble radical inverses, one permutation per dimension.
///
/// The table is built once and shared by reference between every sampler that needs it.
#[derive(Clone, Debug)]
pub struct PermutationTable {
    /// Prime base for each dimension.
    primes: Vec<u64>,

    /// Start of each dimension's permutation in `perms`.
    offsets: Vec<usize>,

    /// Concatenated permutations.
    perms: Vec<u16>,
}

impl PermutationTable {
    /// Build a table covering `n_dimensions` dimensions.
    ///
    /// * `n_dimensions` - Number of dimensions.
    /// * `rng`          - Random number generator used to shuffle digits.
    pub fn new(n_dimensions: usize, rng: &mut RNG) -> Self {
        let primes = first_primes(n_dimensions);
        let mut offsets = Vec::with_capacity(n_dimensions);
        let mut perms: Vec<u16> = Vec::with_capacity(primes.iter().sum::<u64>() as usize);
        for &p in primes.iter() {
            offsets.push(perms.len());
            let start = perms.len();
            perms.extend((0..p).map(|d| d as u16));
            rng.shuffle(&mut perms[start..]);
        }
        Self { primes, offsets, perms }
    }

    /// Number of dimensions covered.
    pub fn dimensions(&self) -> usize {
        self.primes.len()
    }

    /// Returns the prime base for a dimension.
    ///
    /// * `dim` - The dimension.
    pub fn prime(&self, dim: usize) -> u64 {
        self.primes[dim]
    }

    /// Returns the digit permutation for a dimension.
    ///
    /// * `dim` - The dimension.
    pub fn permutation(&self, dim: usize) -> &[u16] {
        let start = self.offsets[dim];
        &self.perms[start..start + self.primes[dim] as usize]
    }

    /// Computes the scrambled radical inverse of `a` for a dimension.
    ///
    /// * `dim` - The dimension.
    /// * `a`   - The integer.
    pub fn scrambled_radical_inverse(&self, dim: usize, mut a: u64) -> Float {
        let base = self.primes[dim];
        let perm = self.permutation(dim);
        let inv_base = 1.0 / base as f64;
        let mut reversed_digits = 0_u64;
        let mut inv_base_n = 1.0_f64;
        while a > 0 {
            let next = a / base;
            let digit = a - next * base;
            reversed_digits = reversed_digits * base + perm[digit as usize] as u64;
            inv_base_n *= inv_base;
            a = next;
        }
        // Account for the infinite tail of permuted zero digits.
        let tail = inv_base_n * inv_base * perm[0] as f64 / (1.0 - inv_base);
        min(((reversed_digits as f64) * inv_base_n + tail) as Float, ONE_MINUS_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn primes() {
        assert_eq!(first_primes(8), vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn base_two_radical_inverse() {
        assert_eq!(radical_inverse(2, 0), 0.0);
        assert!(approx_eq!(Float, radical_inverse(2, 1), 0.5, epsilon = 1e-7));
        assert!(approx_eq!(Float, radical_inverse(2, 2), 0.25, epsilon = 1e-7));
        assert!(approx_eq!(Float, radical_inverse(2, 3), 0.75, epsilon = 1e-7));
        assert!(approx_eq!(Float, radical_inverse(3, 1), 1.0 / 3.0, epsilon = 1e-7));
    }

    #[test]
    fn table_permutations_are_permutations() {
        let table = PermutationTable::new(16, &mut RNG::default());
        assert_eq!(table.dimensions(), 16);
        for dim in 0..16 {
            let mut perm: Vec<u16> = table.permutation(dim).to_vec();
            perm.sort_unstable();
            let expected: Vec<u16> = (0..table.prime(dim) as u16).collect();
            assert_eq!(perm, expected);
        }
    }

    proptest! {
        #[test]
        fn inverse_radical_inverse_round_trip(a in 0..512u64) {
            // 9 base-2 digits cover [0, 512).
            let v = radical_inverse(2, a);
            let reversed = (v as f64 * 512.0).round() as u64;
            prop_assert_eq!(inverse_radical_inverse(2, reversed, 9), a);
        }

        #[test]
        fn scrambled_in_unit_interval(dim in 0..16usize, a in 0..100000u64) {
            let table = PermutationTable::new(16, &mut RNG::new(3));
            let v = table.scrambled_radical_inverse(dim, a);
            prop_assert!((0.0..1.0).contains(&v));
        }
    }
}
