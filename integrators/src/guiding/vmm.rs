//! Von Mises-Fisher Mixtures
//!
//! Sampling and evaluation follow Jakob, "Numerically stable sampling of the von Mises Fisher
//! distribution on S² (and other tricks)". Fitting uses weighted online expectation maximisation with
//! per-lobe parallax distances so that a mixture learned at one position can be reused nearby.

use super::SampleData;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::rng::ONE_MINUS_EPSILON;

/// Number of lobes in a mixture.
pub const N_COMPONENTS: usize = 32;

/// Concentration of freshly initialised lobes.
const INITIAL_KAPPA: Float = 5.0;

/// Bounds for the concentration estimated from the mean cosine.
const MIN_KAPPA: Float = 1e-2;
const MAX_KAPPA: Float = 1e4;

/// Mean cosines above this make the concentration estimate blow up.
const MAX_MEAN_COSINE: Float = 0.9999;

/// EM stops after this many iterations or when the relative log-likelihood gain drops below the threshold.
const MAX_EM_ITERATIONS: usize = 128;
const EM_THRESHOLD: Float = 5e-3;

/// A single von Mises-Fisher lobe.
#[derive(Copy, Clone, Debug)]
pub struct VMFLobe {
    /// Mean direction.
    pub mu: Vector3f,

    /// Mixture weight.
    pub alpha: Float,

    /// Concentration.
    kappa: Float,

    /// Cached `exp(-2κ)`.
    e_min_2_kappa: Float,

    /// Cached normalization `κ / (2π(1 - exp(-2κ)))`.
    pdf_factor: Float,
}

impl VMFLobe {
    /// Create a new `VMFLobe`.
    ///
    /// * `mu`    - Mean direction.
    /// * `kappa` - Concentration.
    /// * `alpha` - Mixture weight.
    pub fn new(mu: Vector3f, kappa: Float, alpha: Float) -> Self {
        let mut lobe = Self {
            mu,
            alpha,
            kappa: 0.0,
            e_min_2_kappa: 1.0,
            pdf_factor: 0.0,
        };
        lobe.set_kappa(kappa);
        lobe
    }

    /// Returns the concentration.
    pub fn kappa(&self) -> Float {
        self.kappa
    }

    /// Set the concentration and refresh the cached normalization.
    ///
    /// * `kappa` - Concentration.
    pub fn set_kappa(&mut self, kappa: Float) {
        self.kappa = kappa;
        self.e_min_2_kappa = (-2.0 * kappa).exp();
        self.pdf_factor = kappa / (TWO_PI * (1.0 - self.e_min_2_kappa));
    }

    /// Returns the density of a direction.
    ///
    /// * `w` - Normalized direction.
    #[inline]
    pub fn pdf(&self, w: &Vector3f) -> Float {
        self.pdf_factor * (self.kappa * (self.mu.dot(w) - 1.0)).exp()
    }

    /// Sample a direction.
    ///
    /// * `u` - Sample value in [0, 1)^2.
    pub fn sample(&self, u: &Point2f) -> Vector3f {
        let (sin_phi, cos_phi) = (TWO_PI * u.y).sin_cos();

        let value = u.x + (1.0 - u.x) * self.e_min_2_kappa;
        let cos_theta = clamp(1.0 + value.ln() / self.kappa, -1.0, 1.0);
        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);

        let omega = Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);
        frame_to_world(&self.mu, &omega)
    }
}

/// Transform a direction from the frame around `n` to world space using the branchless orthonormal
/// basis of Duff et al., "Building an Orthonormal Basis, Revisited".
///
/// * `n` - Normalized frame axis.
/// * `v` - Direction in the frame.
fn frame_to_world(n: &Vector3f, v: &Vector3f) -> Vector3f {
    let sign = (1.0 as Float).copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;
    let x = Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    let y = Vector3f::new(b, sign + n.y * n.y * a, -n.y);
    x * v.x + y * v.y + *n * v.z
}

/// A mixture of `N_COMPONENTS` von Mises-Fisher lobes.
#[derive(Clone, Debug)]
pub struct VMFMixture {
    /// The lobes. Weights sum to one.
    lobes: [VMFLobe; N_COMPONENTS],
}

impl VMFMixture {
    /// Create a mixture from its lobes.
    ///
    /// * `lobes` - The lobes.
    pub fn new(lobes: [VMFLobe; N_COMPONENTS]) -> Self {
        Self { lobes }
    }

    /// Returns the lobes.
    pub fn lobes(&self) -> &[VMFLobe] {
        &self.lobes
    }

    /// Returns the density of a direction.
    ///
    /// * `w` - Normalized direction.
    pub fn pdf(&self, w: &Vector3f) -> Float {
        self.lobes.iter().map(|lobe| lobe.alpha * lobe.pdf(w)).sum()
    }

    /// Sample a direction. The first dimension picks a lobe and is then rescaled and reused.
    ///
    /// * `u` - Sample value in [0, 1)^2.
    pub fn sample(&self, u: &Point2f) -> Vector3f {
        let mut k = 0;
        let mut alpha_sum = 0.0;
        while k < N_COMPONENTS - 1 && u.x >= alpha_sum + self.lobes[k].alpha {
            alpha_sum += self.lobes[k].alpha;
            k += 1;
        }

        let lobe = &self.lobes[k];
        let ux = if lobe.alpha > 0.0 {
            clamp((u.x - alpha_sum) / lobe.alpha, 0.0, ONE_MINUS_EPSILON)
        } else {
            u.x
        };
        lobe.sample(&Point2f::new(ux, u.y))
    }
}

/// A mixture whose lobes remember the distance to the radiance they represent. Moving the mixture to a new
/// position re-aims every lobe with a finite distance at the same point.
#[derive(Clone, Debug)]
pub struct ParallaxAwareVMM {
    /// The mixture as seen from `current_position`.
    mixture: VMFMixture,

    /// Mean cosine of each lobe.
    mean_cosine: [Float; N_COMPONENTS],

    /// Harmonic mean distance of each lobe; infinite until learned.
    distances: [Float; N_COMPONENTS],

    /// Accumulated weights of the distance estimates.
    distance_weight_sums: [Float; N_COMPONENTS],

    /// Position the mixture is currently centred at.
    current_position: Point3f,

    /// Moving average of the sample weights.
    sample_weight_sum: Float,

    /// Number of batches seen.
    batch_index: Float,
}

impl Default for ParallaxAwareVMM {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallaxAwareVMM {
    /// Create a new `ParallaxAwareVMM` with uniformly spread lobes. Mean directions come from a spherical
    /// Fibonacci point set (Marques et al., "Spherical Fibonacci Point Sets for Illumination Integrals").
    pub fn new() -> Self {
        let lobes = std::array::from_fn(|c| {
            let (sin_phi, cos_phi) = (2.0 * c as Float * PI * 0.618034).sin_cos();
            let cos_theta = 1.0 - (2 * c + 1) as Float / N_COMPONENTS as Float;
            let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
            let mu = Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);
            VMFLobe::new(mu, INITIAL_KAPPA, 1.0 / N_COMPONENTS as Float)
        });

        Self {
            mixture: VMFMixture::new(lobes),
            mean_cosine: [0.0; N_COMPONENTS],
            distances: [INFINITY; N_COMPONENTS],
            distance_weight_sums: [0.0; N_COMPONENTS],
            current_position: Point3f::zero(),
            sample_weight_sum: 0.0,
            batch_index: 0.0,
        }
    }

    /// Returns the mixture as seen from the current position.
    pub fn mixture(&self) -> &VMFMixture {
        &self.mixture
    }

    /// Fit the mixture to a batch of samples. The mixture is first moved to `new_position` and the samples
    /// are re-aimed from there at the points their radiance came from.
    ///
    /// * `new_position` - The new centre of the mixture.
    /// * `samples`      - The batch.
    pub fn update(&mut self, new_position: &Point3f, samples: &mut [SampleData]) {
        if samples.is_empty() {
            return;
        }

        self.warp_to(new_position);

        for sample in samples.iter_mut() {
            let origin = sample.position + sample.direction * sample.distance;
            let po = origin - *new_position;
            let t = po.length();
            if t > 0.0 {
                sample.direction = po / t;
                sample.distance = t;
            }
        }

        self.update_lobes(samples);
        self.update_distances(samples);
    }

    /// Returns a copy of the mixture re-aimed as seen from another position.
    ///
    /// * `new_position` - The query position.
    pub fn get_warped(&self, new_position: &Point3f) -> VMFMixture {
        let mut out = self.mixture.clone();
        let new_to_current = self.current_position - *new_position;
        for (k, lobe) in out.lobes.iter_mut().enumerate() {
            if let Some((mu, _)) = self.warped_mean(k, &new_to_current) {
                lobe.mu = mu;
            }
        }
        out
    }

    /// Split off a copy for a new kd-tree region. Both halves keep a quarter of the accumulated statistics
    /// so they adapt quickly to their own samples.
    pub fn split(&mut self) -> Self {
        self.sample_weight_sum *= 0.25;
        for weight_sum in self.distance_weight_sums.iter_mut() {
            *weight_sum *= 0.25;
        }
        self.clone()
    }

    /// Returns the re-aimed mean direction of a lobe and its new distance, or `None` if the lobe has no
    /// finite distance.
    ///
    /// * `k`              - Lobe index.
    /// * `new_to_current` - Offset from the new position to the current one.
    fn warped_mean(&self, k: usize, new_to_current: &Vector3f) -> Option<(Vector3f, Float)> {
        let distance = self.distances[k];
        if !distance.is_finite() {
            return None;
        }
        let po = self.mixture.lobes[k].mu * distance + *new_to_current;
        let t = po.length();
        if t > 0.0 {
            Some((po / t, t))
        } else {
            None
        }
    }

    /// Move the mixture to a new position.
    ///
    /// * `new_position` - The new centre.
    fn warp_to(&mut self, new_position: &Point3f) {
        let new_to_current = self.current_position - *new_position;
        for k in 0..N_COMPONENTS {
            if let Some((mu, t)) = self.warped_mean(k, &new_to_current) {
                self.mixture.lobes[k].mu = mu;
                self.distances[k] = t;
            }
        }
        self.current_position = *new_position;
    }

    /// Convert a mean cosine to a concentration.
    ///
    /// * `r` - Mean cosine.
    fn mean_cosine_to_kappa(r: Float) -> Float {
        let kappa = r * (3.0 - r * r) / (1.0 - r * r);
        clamp(kappa, MIN_KAPPA, MAX_KAPPA)
    }

    /// Weighted online EM (Liang and Klein, "Online EM for Unsupervised Models") blending the sufficient
    /// statistics of previous batches with the current one.
    ///
    /// * `samples` - The batch.
    fn update_lobes(&mut self, samples: &[SampleData]) {
        let mut last_gamma_weight_sums = [0.0; N_COMPONENTS];
        let mut last_gamma_weight_sample_sums = [Vector3f::zero(); N_COMPONENTS];
        for (k, lobe) in self.mixture.lobes.iter().enumerate() {
            last_gamma_weight_sums[k] = self.sample_weight_sum * lobe.alpha;
            last_gamma_weight_sample_sums[k] = lobe.mu * (self.mean_cosine[k] * last_gamma_weight_sums[k]);
        }

        let batch_sample_weight_sum: Float = samples.iter().map(|s| s.weight()).sum();

        self.batch_index += 1.0;
        let moving_weight = 1.0 / self.batch_index;
        self.sample_weight_sum = lerp(moving_weight, self.sample_weight_sum, batch_sample_weight_sum);

        let mut partial_pdfs = [0.0; N_COMPONENTS];
        let mut last_log_likelihood = 0.0;

        for iteration in 0..MAX_EM_ITERATIONS {
            let mut log_likelihood = 0.0;
            let mut batch_gamma_weight_sums = [0.0; N_COMPONENTS];
            let mut batch_gamma_weight_sample_sums = [Vector3f::zero(); N_COMPONENTS];

            for sample in samples {
                let mut pdf = 0.0;
                for (k, lobe) in self.mixture.lobes.iter().enumerate() {
                    partial_pdfs[k] = lobe.alpha * lobe.pdf(&sample.direction);
                    pdf += partial_pdfs[k];
                }
                // Guard against running out of precision far from every lobe.
                let pdf = max(pdf, Float::MIN_POSITIVE);

                let weight = sample.weight();
                for k in 0..N_COMPONENTS {
                    let gamma_weight = partial_pdfs[k] / pdf * weight;
                    batch_gamma_weight_sums[k] += gamma_weight;
                    batch_gamma_weight_sample_sums[k] += sample.direction * gamma_weight;
                }

                log_likelihood += weight * pdf.ln();
            }

            for k in 0..N_COMPONENTS {
                let gamma_weight_sum = lerp(moving_weight, last_gamma_weight_sums[k], batch_gamma_weight_sums[k]);
                let gamma_weight_sample_sum = lerp(
                    moving_weight,
                    last_gamma_weight_sample_sums[k],
                    batch_gamma_weight_sample_sums[k],
                );
                let r_length = gamma_weight_sample_sum.length();
                if gamma_weight_sum > 0.0 && r_length > 0.0 && self.sample_weight_sum > 0.0 {
                    let lobe = &mut self.mixture.lobes[k];
                    lobe.alpha = gamma_weight_sum / self.sample_weight_sum;
                    lobe.mu = gamma_weight_sample_sum / r_length;
                    self.mean_cosine[k] = min(r_length / gamma_weight_sum, MAX_MEAN_COSINE);
                    lobe.set_kappa(Self::mean_cosine_to_kappa(self.mean_cosine[k]));
                }
            }

            if iteration >= 1 && (log_likelihood - last_log_likelihood) / abs(last_log_likelihood) < EM_THRESHOLD {
                debug!("EM converged after {} iterations", iteration + 1);
                break;
            }
            last_log_likelihood = log_likelihood;
        }
    }

    /// Update the per-lobe distances with a weighted harmonic mean.
    ///
    /// * `samples` - The batch.
    fn update_distances(&mut self, samples: &[SampleData]) {
        let mut component_pdfs = [0.0; N_COMPONENTS];
        let mut batch_weighted_distance_sums = [0.0; N_COMPONENTS];
        let mut batch_distance_weight_sums = [0.0; N_COMPONENTS];

        for sample in samples {
            let weight = sample.weight();

            let mut pdf = 0.0;
            for (k, lobe) in self.mixture.lobes.iter().enumerate() {
                component_pdfs[k] = lobe.pdf(&sample.direction);
                pdf += lobe.alpha * component_pdfs[k];
            }
            if !(pdf > 0.0) {
                continue;
            }

            for (k, lobe) in self.mixture.lobes.iter().enumerate() {
                let gamma = lobe.alpha * component_pdfs[k] / pdf;
                let distance_weight = weight * gamma * component_pdfs[k];
                batch_weighted_distance_sums[k] += distance_weight / sample.distance;
                batch_distance_weight_sums[k] += distance_weight;
            }
        }

        let moving_weight = 1.0 / self.batch_index;
        for k in 0..N_COMPONENTS {
            if batch_distance_weight_sums[k] > 0.0 && batch_weighted_distance_sums[k] > 0.0 {
                let weighted_distance_sum = self.distance_weight_sums[k] / self.distances[k];
                let new_weight_sum = lerp(moving_weight, self.distance_weight_sums[k], batch_distance_weight_sums[k]);
                let new_weighted_distance_sum =
                    lerp(moving_weight, weighted_distance_sum, batch_weighted_distance_sums[k]);
                self.distances[k] = new_weight_sum / new_weighted_distance_sum;
                self.distance_weight_sums[k] = new_weight_sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;
    use rtcore::sampling::*;

    /// Monte Carlo estimate of the integral of the density over the sphere.
    fn integrate(mixture: &VMFMixture) -> Float {
        let n = 256;
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let u = Point2f::new((i as Float + 0.5) / n as Float, (j as Float + 0.5) / n as Float);
                sum += mixture.pdf(&uniform_sample_sphere(&u)) / uniform_sphere_pdf();
            }
        }
        sum / (n * n) as Float
    }

    fn samples_around(position: Point3f, direction: Vector3f, n: usize) -> Vec<SampleData> {
        (0..n)
            .map(|i| {
                let jitter = Vector3f::new(
                    0.05 * ((i % 7) as Float - 3.0) / 3.0,
                    0.05 * ((i % 5) as Float - 2.0) / 2.0,
                    0.0,
                );
                let d = (direction + jitter).normalize();
                SampleData::new(position, d, 1.0, 0.5, 10.0)
            })
            .collect()
    }

    #[test]
    fn initial_mixture_is_normalized() {
        let vmm = ParallaxAwareVMM::new();
        let alpha_sum: Float = vmm.mixture().lobes().iter().map(|l| l.alpha).sum();
        assert!(approx_eq!(Float, alpha_sum, 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, integrate(vmm.mixture()), 1.0, epsilon = 0.01));
    }

    #[test]
    fn fitted_mixture_concentrates_on_samples() {
        let mut vmm = ParallaxAwareVMM::new();
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let mut samples = samples_around(Point3f::zero(), up, 500);
        vmm.update(&Point3f::zero(), &mut samples);

        let mixture = vmm.mixture();
        assert!(mixture.pdf(&up) > 10.0 * mixture.pdf(&-up));
        let alpha_sum: Float = mixture.lobes().iter().map(|l| l.alpha).sum();
        assert!(approx_eq!(Float, alpha_sum, 1.0, epsilon = 1e-3));
    }

    #[test]
    fn warping_reaims_lobes() {
        let mut vmm = ParallaxAwareVMM::new();
        let mut samples = samples_around(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0), 500);
        vmm.update(&Point3f::zero(), &mut samples);

        // The radiance sits 10 units above the origin; seen from (10, 0, 10) it lies along -x.
        let warped = vmm.get_warped(&Point3f::new(10.0, 0.0, 10.0));
        let toward = Vector3f::new(-1.0, 0.0, 0.0);
        assert!(warped.pdf(&toward) > 10.0 * warped.pdf(&-toward));
    }

    #[test]
    fn split_keeps_the_distribution() {
        let mut vmm = ParallaxAwareVMM::new();
        let mut samples = samples_around(Point3f::zero(), Vector3f::new(1.0, 0.0, 0.0), 200);
        vmm.update(&Point3f::zero(), &mut samples);
        let right = vmm.split();
        let w = Vector3f::new(1.0, 0.0, 0.0);
        assert!(approx_eq!(Float, right.mixture().pdf(&w), vmm.mixture().pdf(&w)));
        assert!(approx_eq!(Float, right.sample_weight_sum, vmm.sample_weight_sum));
    }

    #[test]
    fn kappa_from_mean_cosine() {
        assert!(approx_eq!(Float, ParallaxAwareVMM::mean_cosine_to_kappa(0.0), MIN_KAPPA));
        let sharpest = ParallaxAwareVMM::mean_cosine_to_kappa(MAX_MEAN_COSINE);
        assert!(sharpest <= MAX_KAPPA && sharpest > 0.9 * MAX_KAPPA, "kappa {sharpest}");
        assert_eq!(ParallaxAwareVMM::mean_cosine_to_kappa(0.99999), MAX_KAPPA);
        let r = 0.5;
        let expected = r * (3.0 - r * r) / (1.0 - r * r);
        assert!(approx_eq!(Float, ParallaxAwareVMM::mean_cosine_to_kappa(r), expected));
    }

    proptest! {
        #[test]
        fn lobe_samples_are_unit(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32, kappa in 0.01..1000.0f32) {
            let mu = Vector3f::new(0.3, -0.4, 0.5).normalize();
            let lobe = VMFLobe::new(mu, kappa, 1.0);
            let w = lobe.sample(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-3));
        }

        #[test]
        fn mixture_samples_have_positive_density(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let vmm = ParallaxAwareVMM::new();
            let w = vmm.mixture().sample(&Point2f::new(u0, u1));
            prop_assert!(vmm.mixture().pdf(&w) > 0.0);
        }
    }
}
