//! Adaptive kd-tree

use super::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::reflection::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Number of samples a region accumulates before it is split.
pub const DEFAULT_MAX_REGION_SAMPLES: usize = 32768;

/// Maximum depth of the tree.
pub const DEFAULT_MAX_DEPTH: usize = 17;

/// Below this many samples both halves are updated on the current thread.
const PARALLEL_UPDATE_THRESHOLD: usize = 512;

/// A leaf of the tree: running position statistics of the samples that fell into it and the learned
/// directional distribution.
#[derive(Clone, Debug, Default)]
pub struct Region {
    /// Mean sample position.
    pub pos_mean: [f64; 3],

    /// Per axis variance of the sample positions.
    pub pos_var: [f64; 3],

    /// Number of samples in the statistics.
    pub num_samples: usize,

    /// The directional distribution.
    pub model: ParallaxAwareVMM,
}

impl Region {
    /// Create a new `Region` with empty statistics.
    ///
    /// * `model` - The directional distribution.
    pub fn new(model: ParallaxAwareVMM) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    /// Returns the mean sample position.
    pub fn position_mean(&self) -> Point3f {
        Point3f::new(self.pos_mean[0] as Float, self.pos_mean[1] as Float, self.pos_mean[2] as Float)
    }

    /// Fold sample positions into the running mean and variance.
    ///
    /// * `samples` - The samples.
    pub fn update_stats(&mut self, samples: &[SampleData]) {
        for sample in samples {
            let p = sample.position;
            if self.num_samples == 0 {
                self.pos_mean = [p.x as f64, p.y as f64, p.z as f64];
                self.pos_var = [0.0; 3];
                self.num_samples = 1;
                continue;
            }

            let n = self.num_samples as f64;
            for axis in 0..3 {
                let diff = p[axis] as f64 - self.pos_mean[axis];
                self.pos_mean[axis] += diff / (n + 1.0);
                self.pos_var[axis] += diff * diff / (n + 1.0) - self.pos_var[axis] / n;
            }
            self.num_samples += 1;
        }
    }

    /// Reset the position statistics.
    pub fn clear_stats(&mut self) {
        self.num_samples = 0;
        self.pos_mean = [0.0; 3];
        self.pos_var = [0.0; 3];
    }
}

/// A node of the tree.
#[derive(Clone, Debug)]
pub enum KDNode {
    /// A leaf owning a region.
    Leaf(Region),

    /// An inner node. Positions below `split` on `axis` go to the first child.
    Inner {
        /// Split axis.
        axis: Axis,

        /// Split position.
        split: Float,

        /// The two children.
        children: Box<[KDNode; 2]>,
    },
}

/// Spatial subdivision of the scene whose leaves hold directional distributions of incident radiance.
#[derive(Clone, Debug)]
pub struct AdaptiveKDTree {
    /// The root node.
    root: KDNode,

    /// Number of samples a region accumulates before it is split.
    max_region_samples: usize,

    /// Maximum depth of the tree.
    max_depth: usize,
}

impl Default for AdaptiveKDTree {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REGION_SAMPLES, DEFAULT_MAX_DEPTH)
    }
}

impl AdaptiveKDTree {
    /// Create a tree with a single region.
    ///
    /// * `max_region_samples` - Number of samples a region accumulates before it is split.
    /// * `max_depth`          - Maximum depth of the tree.
    pub fn new(max_region_samples: usize, max_depth: usize) -> Self {
        Self {
            root: KDNode::Leaf(Region::new(ParallaxAwareVMM::new())),
            max_region_samples,
            max_depth,
        }
    }

    /// Returns the region containing a position.
    ///
    /// * `p` - The position.
    pub fn lookup(&self, p: &Point3f) -> &Region {
        let mut node = &self.root;
        loop {
            match node {
                KDNode::Leaf(region) => return region,
                KDNode::Inner { axis, split, children } => {
                    node = if p[*axis] < *split { &children[0] } else { &children[1] };
                }
            }
        }
    }

    /// Returns a guided BSDF for sampling and pdf evaluation at a position.
    ///
    /// * `bsdf` - The BSDF at the position.
    /// * `p`    - The position.
    pub fn get_guided_bxdf<'a>(&self, bsdf: &'a BSDF, p: &Point3f) -> GuidedBxDF<'a> {
        GuidedBxDF::new(self.lookup(p).model.get_warped(p), bsdf)
    }

    /// Returns the number of leaves.
    pub fn leaf_count(&self) -> usize {
        fn count(node: &KDNode) -> usize {
            match node {
                KDNode::Leaf(_) => 1,
                KDNode::Inner { children, .. } => count(&children[0]) + count(&children[1]),
            }
        }
        count(&self.root)
    }

    /// Returns the depth of the tree; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn depth(node: &KDNode) -> usize {
            match node {
                KDNode::Leaf(_) => 0,
                KDNode::Inner { children, .. } => 1 + max(depth(&children[0]), depth(&children[1])),
            }
        }
        depth(&self.root)
    }

    /// Train the tree with a batch of samples. The samples are reordered and re-aimed in place.
    ///
    /// * `samples` - The batch.
    /// * `pool`    - Worker threads for the update.
    pub fn update(&mut self, samples: &mut [SampleData], pool: &ThreadPool) {
        let max_region_samples = self.max_region_samples;
        let max_depth = self.max_depth;
        let root = &mut self.root;
        pool.install(|| update_node(root, samples, 0, max_region_samples, max_depth));
    }
}

/// Create the worker pool used for tree updates.
///
/// * `n_threads` - Number of worker threads.
pub fn update_pool(n_threads: usize) -> Result<ThreadPool, String> {
    ThreadPoolBuilder::new()
        .num_threads(max(n_threads, 1))
        .thread_name(|i| format!("guiding-update-{i}"))
        .build()
        .map_err(|err| format!("Unable to create guiding thread pool: {err}"))
}

/// Returns the axis of largest position variance.
///
/// * `var` - Per axis variance.
fn split_axis(var: &[f64; 3]) -> Axis {
    Vector3::new(var[0], var[1], var[2]).max_dimension()
}

/// Reorder samples so that all samples matching `pred` come first. Returns their count.
///
/// * `samples` - The samples.
/// * `pred`    - The predicate.
fn partition<F>(samples: &mut [SampleData], pred: F) -> usize
where
    F: Fn(&SampleData) -> bool,
{
    let mut first = 0;
    for i in 0..samples.len() {
        if pred(&samples[i]) {
            samples.swap(first, i);
            first += 1;
        }
    }
    first
}

/// Route samples down a subtree, splitting leaves that exceed the sample cap.
///
/// * `node`               - Root of the subtree.
/// * `samples`            - Samples falling into the subtree.
/// * `depth`              - Depth of `node`.
/// * `max_region_samples` - Number of samples a region accumulates before it is split.
/// * `max_depth`          - Maximum depth of the tree.
fn update_node(
    node: &mut KDNode,
    samples: &mut [SampleData],
    depth: usize,
    max_region_samples: usize,
    max_depth: usize,
) {
    if samples.is_empty() {
        return;
    }

    let mut split_leaf = None;
    if let KDNode::Leaf(region) = node {
        region.update_stats(samples);
        if region.num_samples < max_region_samples {
            let mean = region.position_mean();
            region.model.update(&mean, samples);
            return;
        }

        if depth >= max_depth {
            warn!("Guiding kd-tree reached its maximum depth {max_depth}");
            let mean = region.position_mean();
            region.model.update(&mean, samples);
            return;
        }

        let axis = split_axis(&region.pos_var);
        let split = region.pos_mean[usize::from(axis)] as Float;
        region.clear_stats();
        let right = Region::new(region.model.split());
        let left = std::mem::take(region);
        split_leaf = Some((axis, split, left, right));
    }

    if let Some((axis, split, left, right)) = split_leaf {
        debug!("Splitting guiding region at depth {depth} on axis {axis:?} at {split}");
        *node = KDNode::Inner {
            axis,
            split,
            children: Box::new([KDNode::Leaf(left), KDNode::Leaf(right)]),
        };
    }

    if let KDNode::Inner { axis, split, children } = node {
        let (axis, split) = (*axis, *split);
        let middle = partition(samples, |s| s.position[axis] < split);
        let (left_samples, right_samples) = samples.split_at_mut(middle);
        let [left, right] = &mut **children;

        if left_samples.len() + right_samples.len() < PARALLEL_UPDATE_THRESHOLD {
            update_node(left, left_samples, depth + 1, max_region_samples, max_depth);
            update_node(right, right_samples, depth + 1, max_region_samples, max_depth);
        } else {
            rayon::join(
                || update_node(left, left_samples, depth + 1, max_region_samples, max_depth),
                || update_node(right, right_samples, depth + 1, max_region_samples, max_depth),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn samples_along_x(n: usize) -> Vec<SampleData> {
        (0..n)
            .map(|i| {
                let x = i as Float / n as Float * 10.0 - 5.0;
                SampleData::new(
                    Point3f::new(x, 0.0, 0.0),
                    Vector3f::new(0.0, 0.0, 1.0),
                    1.0,
                    1.0,
                    2.0,
                )
            })
            .collect()
    }

    #[test]
    fn region_statistics() {
        let mut region = Region::default();
        let samples = samples_along_x(4);
        region.update_stats(&samples);
        assert_eq!(region.num_samples, 4);
        // Positions -5, -2.5, 0, 2.5.
        assert!(approx_eq!(f64, region.pos_mean[0], -1.25, epsilon = 1e-9));
        // Unbiased sample variance.
        assert!(approx_eq!(f64, region.pos_var[0], 31.25 / 3.0, epsilon = 1e-6));
        assert_eq!(region.pos_var[1], 0.0);
        assert_eq!(split_axis(&region.pos_var), Axis::X);
    }

    #[test]
    fn small_batches_do_not_split() {
        let mut tree = AdaptiveKDTree::new(64, DEFAULT_MAX_DEPTH);
        let mut samples = samples_along_x(32);
        tree.update(&mut samples, &update_pool(1).unwrap());
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.lookup(&Point3f::zero()).num_samples, 32);
    }

    #[test]
    fn full_region_splits_at_mean() {
        let mut tree = AdaptiveKDTree::new(64, DEFAULT_MAX_DEPTH);
        let mut samples = samples_along_x(100);
        tree.update(&mut samples, &update_pool(2).unwrap());

        assert!(tree.leaf_count() >= 2);
        match &tree.root {
            KDNode::Inner { axis, split, .. } => {
                assert_eq!(*axis, Axis::X);
                assert!(approx_eq!(Float, *split, -0.05, epsilon = 1e-3));
            }
            KDNode::Leaf(_) => panic!("expected a split"),
        }

        let left = tree.lookup(&Point3f::new(-4.0, 0.0, 0.0));
        let right = tree.lookup(&Point3f::new(4.0, 0.0, 0.0));
        assert_eq!(left.num_samples + right.num_samples, 100);
    }

    #[test]
    fn depth_is_capped() {
        let mut tree = AdaptiveKDTree::new(2, 3);
        let mut samples = samples_along_x(2000);
        tree.update(&mut samples, &update_pool(4).unwrap());
        assert!(tree.depth() <= 3);
    }
}
