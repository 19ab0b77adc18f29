//! Guiding Cache

use super::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::reflection::*;
use rayon::ThreadPool;
use std::mem::size_of;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// Samples closer to their source than this carry no usable parallax information.
const MIN_SAMPLE_DISTANCE: Float = 1e-3;

/// Settings of the guided path tracer.
#[derive(Copy, Clone, Debug)]
pub struct GuidingConfig {
    /// Surfaces below this roughness are sampled with their BSDF only and record no training samples.
    pub min_roughness: Float,

    /// Surfaces at or above this roughness reset the accumulated distance of training samples.
    pub glossy_threshold: Float,

    /// Fraction of the samples per pixel spent training.
    pub training_fraction: Float,

    /// Samples per pixel rendered between two tree updates.
    pub spp_per_iteration: usize,

    /// Minimum number of buffered samples needed for an update at the end of an iteration.
    pub min_samples_to_train: usize,

    /// Buffered samples that force an immediate update.
    pub max_buffer_size: usize,

    /// Paths longer than this are terminated.
    pub path_length_limit: usize,
}

impl Default for GuidingConfig {
    fn default() -> Self {
        Self {
            min_roughness: 0.01,
            glossy_threshold: 0.3,
            training_fraction: 0.5,
            spp_per_iteration: 4,
            min_samples_to_train: 128,
            max_buffer_size: (256 << 20) / size_of::<SampleData>(),
            path_length_limit: 16,
        }
    }
}

impl GuidingConfig {
    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.training_fraction) {
            return Err(format!(
                "Training fraction must be in [0, 1], got {}",
                self.training_fraction
            ));
        }
        if self.spp_per_iteration == 0 {
            return Err(String::from("Samples per iteration must be greater than 0"));
        }
        if self.max_buffer_size == 0 {
            return Err(String::from("Sample buffer size must be greater than 0"));
        }
        if self.min_roughness < 0.0 || self.glossy_threshold < self.min_roughness {
            return Err(format!(
                "Invalid roughness thresholds {} and {}",
                self.min_roughness, self.glossy_threshold
            ));
        }
        Ok(())
    }

    /// Returns the number of samples per pixel spent training out of a total.
    ///
    /// * `spp` - Total samples per pixel.
    pub fn training_spp(&self, spp: usize) -> usize {
        (self.training_fraction * spp as Float) as usize
    }
}

/// Shared learned radiance distribution. Render threads append training samples concurrently and read the
/// tree while sampling; updates take the tree exclusively.
pub struct GuidingCache {
    /// The settings.
    pub config: GuidingConfig,

    /// Training samples waiting for the next update.
    buffer: Mutex<Vec<SampleData>>,

    /// The spatio-directional model.
    tree: RwLock<AdaptiveKDTree>,

    /// Whether training samples are collected.
    training: AtomicBool,

    /// Whether the tree has never been updated.
    first_iteration: AtomicBool,

    /// Worker threads used for tree updates.
    pool: ThreadPool,

    /// Number of tree updates so far.
    update_count: AtomicUsize,
}

impl GuidingCache {
    /// Create a new `GuidingCache` with an untrained tree.
    ///
    /// * `config`    - The settings.
    /// * `n_threads` - Number of worker threads used for tree updates.
    pub fn new(config: GuidingConfig, n_threads: usize) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            config,
            buffer: Mutex::new(Vec::new()),
            tree: RwLock::new(AdaptiveKDTree::default()),
            training: AtomicBool::new(false),
            first_iteration: AtomicBool::new(true),
            pool: update_pool(n_threads)?,
            update_count: AtomicUsize::new(0),
        })
    }

    /// Start collecting training samples.
    pub fn start_training(&self) {
        self.training.store(true, Ordering::SeqCst);
    }

    /// Stop collecting training samples and release the buffer.
    pub fn stop_training(&self) {
        self.training.store(false, Ordering::SeqCst);
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        let dropped = buffer.len();
        *buffer = Vec::new();
        if dropped > 0 {
            debug!("Discarded {dropped} training samples");
        }
    }

    /// Returns `true` while training samples are collected.
    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::SeqCst)
    }

    /// Returns `true` until the first tree update.
    pub fn is_first_iteration(&self) -> bool {
        self.first_iteration.load(Ordering::SeqCst)
    }

    /// Returns the number of buffered training samples.
    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns a copy of the buffered training samples.
    #[cfg(test)]
    pub(crate) fn buffered_samples(&self) -> Vec<SampleData> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the number of tree updates so far.
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    /// Append a training sample. Invalid samples and samples too close to their source are ignored. A full
    /// buffer triggers an immediate tree update.
    ///
    /// * `sample` - The sample.
    pub fn add_sample(&self, sample: SampleData) {
        if !sample.is_valid() || sample.distance <= MIN_SAMPLE_DISTANCE {
            return;
        }

        let full = {
            let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
            buffer.push(sample);
            if buffer.len() >= self.config.max_buffer_size {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            }
        };

        if let Some(mut samples) = full {
            debug!("Sample buffer full, updating the guiding tree");
            self.update_tree(&mut samples);
        }
    }

    /// Finish a training iteration. Updates the tree if enough samples were collected, otherwise keeps them
    /// for the next iteration. Returns `true` if the tree was updated.
    pub fn end_iteration(&self) -> bool {
        if !self.is_training() {
            return false;
        }

        let mut samples = {
            let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
            if buffer.len() < self.config.min_samples_to_train {
                debug!("Only {} training samples, skipping the update", buffer.len());
                return false;
            }
            std::mem::take(&mut *buffer)
        };

        self.update_tree(&mut samples);
        self.first_iteration.store(false, Ordering::SeqCst);
        true
    }

    /// Returns the guided BSDF at a position.
    ///
    /// * `bsdf` - The BSDF at the position.
    /// * `p`    - The position.
    pub fn guided_bxdf<'a>(&self, bsdf: &'a BSDF, p: &Point3f) -> GuidedBxDF<'a> {
        let tree = self.tree.read().unwrap_or_else(|e| e.into_inner());
        tree.get_guided_bxdf(bsdf, p)
    }

    /// Run a closure with read access to the tree.
    ///
    /// * `f` - The closure.
    pub fn with_tree<T, F: FnOnce(&AdaptiveKDTree) -> T>(&self, f: F) -> T {
        let tree = self.tree.read().unwrap_or_else(|e| e.into_inner());
        f(&tree)
    }

    /// Train the tree with a batch of samples.
    ///
    /// * `samples` - The batch.
    fn update_tree(&self, samples: &mut [SampleData]) {
        let mut tree = self.tree.write().unwrap_or_else(|e| e.into_inner());
        tree.update(samples, &self.pool);
        let count = self.update_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Guiding update {count}: {} samples, {} regions",
            samples.len(),
            tree.leaf_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> SampleData {
        let x = (i % 17) as Float * 0.1;
        SampleData::new(Point3f::new(x, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), 1.0, 0.5, 3.0)
    }

    fn training_cache(config: GuidingConfig) -> GuidingCache {
        let cache = GuidingCache::new(config, 2).unwrap();
        cache.start_training();
        cache
    }

    #[test]
    fn update_at_threshold() {
        let cache = training_cache(GuidingConfig::default());
        for i in 0..128 {
            cache.add_sample(sample(i));
        }
        assert!(cache.end_iteration());
        assert_eq!(cache.update_count(), 1);
        assert_eq!(cache.buffer_len(), 0);
        assert!(!cache.is_first_iteration());
        assert_eq!(cache.with_tree(|tree| tree.lookup(&Point3f::zero()).num_samples), 128);
    }

    #[test]
    fn small_buffer_is_kept() {
        let cache = training_cache(GuidingConfig::default());
        for i in 0..127 {
            cache.add_sample(sample(i));
        }
        assert!(!cache.end_iteration());
        assert_eq!(cache.update_count(), 0);
        assert_eq!(cache.buffer_len(), 127);
        assert!(cache.is_first_iteration());

        cache.add_sample(sample(127));
        assert!(cache.end_iteration());
        assert_eq!(cache.update_count(), 1);
    }

    #[test]
    fn full_buffer_updates_immediately() {
        let config = GuidingConfig {
            max_buffer_size: 10,
            ..Default::default()
        };
        let cache = training_cache(config);
        for i in 0..25 {
            cache.add_sample(sample(i));
        }
        assert_eq!(cache.update_count(), 2);
        assert_eq!(cache.buffer_len(), 5);
    }

    #[test]
    fn rejects_unusable_samples() {
        let cache = training_cache(GuidingConfig::default());
        let mut near = sample(0);
        near.distance = 1e-4;
        cache.add_sample(near);
        let mut dark = sample(1);
        dark.radiance = 0.0;
        cache.add_sample(dark);
        assert_eq!(cache.buffer_len(), 0);
    }

    #[test]
    fn stop_training_releases_buffer() {
        let cache = training_cache(GuidingConfig::default());
        for i in 0..10 {
            cache.add_sample(sample(i));
        }
        cache.stop_training();
        assert!(!cache.is_training());
        assert_eq!(cache.buffer_len(), 0);
        assert!(!cache.end_iteration());
    }

    #[test]
    fn training_spp_truncates() {
        let config = GuidingConfig::default();
        assert_eq!(config.training_spp(5), 2);
        assert_eq!(config.training_spp(8), 4);
        assert_eq!(config.training_spp(1), 0);
    }

    #[test]
    fn updates_share_one_pool() {
        let config = GuidingConfig {
            max_buffer_size: 10,
            ..Default::default()
        };
        let cache = training_cache(config);
        for i in 0..40 {
            cache.add_sample(sample(i));
        }
        assert_eq!(cache.update_count(), 4);
        assert_eq!(cache.pool.current_num_threads(), 2);
    }

    #[test]
    fn invalid_config() {
        let config = GuidingConfig {
            training_fraction: 1.5,
            ..Default::default()
        };
        assert!(GuidingCache::new(config, 1).is_err());
        let config = GuidingConfig {
            spp_per_iteration: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
