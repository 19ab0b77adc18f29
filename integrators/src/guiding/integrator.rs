//! Guided Path Integrator

use super::*;
use crate::path::*;
use rtcore::geometry::*;
use rtcore::integrator::*;
use rtcore::interaction::*;
use rtcore::pbrt::*;
use rtcore::sampler::*;
use rtcore::scene::*;
use rtcore::spectrum::*;
use std::cell::RefCell;
use std::sync::Arc;

/// Escaped rays are placed this many scene radii away when used for training.
const ENVIRONMENT_DISTANCE_SCALE: Float = 1024.0;

thread_local! {
    /// Per thread storage for the vertices of the path being traced.
    static BOUNCES: RefCell<Vec<BounceInfo>> = RefCell::new(Vec::with_capacity(32));
}

/// What the guided path tracer remembers about one vertex of a path while it is being traced.
#[derive(Copy, Clone, Debug)]
pub struct BounceInfo {
    /// Radiance leaving the vertex towards the previous one, not weighted by the path throughput.
    pub l: Spectrum,

    /// `f·|cosθ| / pdf` of the continuation direction.
    pub bxdf_weight: Spectrum,

    /// Position of the vertex.
    pub position: Point3f,

    /// Continuation direction.
    pub direction: Vector3f,

    /// Density of the continuation direction.
    pub bxdf_pdf: Float,

    /// Distance to the next vertex.
    pub distance: Float,

    /// Roughness at the vertex.
    pub roughness: Float,

    /// Ratio by which a distance behind the vertex is scaled when projected through it.
    pub distance_factor: Float,
}

impl BounceInfo {
    /// Create a new `BounceInfo` for a vertex that has not scattered yet.
    ///
    /// * `position`  - Position of the vertex.
    /// * `roughness` - Roughness at the vertex.
    pub fn new(position: Point3f, roughness: Float) -> Self {
        Self {
            l: Spectrum::default(),
            bxdf_weight: Spectrum::default(),
            position,
            direction: Vector3f::zero(),
            bxdf_pdf: 0.0,
            distance: 0.0,
            roughness,
            distance_factor: 1.0,
        }
    }
}

/// Returns the factor by which a refracted virtual image distance scales; `1` for reflection.
///
/// * `n`  - Surface normal.
/// * `wo` - Outgoing direction.
/// * `wi` - Incident direction.
pub fn compute_distance_factor(n: &Normal3f, wo: &Vector3f, wi: &Vector3f) -> Float {
    let cos_o = n.dot(wo);
    let cos_i = n.dot(wi);
    if cos_o * cos_i <= 0.0 {
        let sin_o = safe_sqrt(1.0 - cos_o * cos_o);
        if sin_o > 0.0 {
            return safe_sqrt(1.0 - cos_i * cos_i) / sin_o;
        }
    }
    1.0
}

/// Scatter strategy that samples rough surfaces with a mixture of their BSDF and the learned distribution.
pub struct GuidedStrategy {
    /// Light sampling and emission.
    pub surface: SurfaceStrategy,

    /// The learned distribution.
    pub cache: Arc<GuidingCache>,
}

impl GuidedStrategy {
    /// Create a new `GuidedStrategy`.
    ///
    /// * `cache` - The learned distribution.
    pub fn new(cache: Arc<GuidingCache>) -> Self {
        Self {
            surface: SurfaceStrategy::default(),
            cache,
        }
    }

    /// Returns the surface interaction if it should be guided.
    ///
    /// * `it` - The interaction.
    fn guided_surface<'a>(&self, it: &'a Interaction) -> Option<&'a SurfaceInteraction> {
        let si = it.as_surface()?;
        if it.roughness() < self.cache.config.min_roughness || self.cache.is_first_iteration() {
            return None;
        }
        Some(si)
    }
}

impl ScatterStrategy for GuidedStrategy {
    fn eval_emittance(
        &self,
        scene: &Scene,
        hit: Option<&SurfaceInteraction>,
        ray: &Ray,
        scatter: &Point3f,
    ) -> LocalRecord {
        self.surface.eval_emittance(scene, hit, ray, scatter)
    }

    fn sample_direct_lighting(
        &self,
        scene: &Scene,
        it: &Interaction,
        ray: &Ray,
        sampler: &mut dyn Sampler,
    ) -> LocalRecord {
        self.surface.sample_direct_lighting(scene, it, ray, sampler)
    }

    fn eval_scatter(&self, it: &Interaction, _ray: &Ray, wi: &Vector3f) -> LocalRecord {
        let mut record = eval_local_scatter(it, wi);
        if let Some(si) = self.guided_surface(it) {
            if let Some(bsdf) = si.bsdf.as_ref() {
                record.pdf = self.cache.guided_bxdf(bsdf, &si.p).pdf(&si.wo, wi);
            }
        }
        record
    }

    fn sample_scatter(&self, it: &Interaction, _ray: &Ray, sampler: &mut dyn Sampler) -> LocalRecord {
        let si = match self.guided_surface(it) {
            Some(si) => si,
            None => return sample_local_scatter(it, sampler),
        };
        let bsdf = match si.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => return LocalRecord::black(),
        };

        let guided = self.cache.guided_bxdf(bsdf, &si.p);
        match guided.sample(&si.wo, &sampler.get_2d()) {
            Some(bs) => LocalRecord::new(bs.wi, bs.f * bs.wi.abs_dot(&si.n), bs.pdf, bsdf.roughness() == 0.0),
            None => LocalRecord::black(),
        }
    }

    fn russian_roulette(&self, _throughput: &Spectrum, bounces: usize) -> Float {
        if bounces > self.cache.config.path_length_limit {
            0.0
        } else {
            1.0
        }
    }
}

/// Collects the vertices of a training path and turns them into samples for the guiding cache.
pub struct GuidingRecorder<'a> {
    /// Receives the samples.
    cache: &'a GuidingCache,

    /// Vertices of the current path.
    bounces: &'a mut Vec<BounceInfo>,
}

impl<'a> GuidingRecorder<'a> {
    /// Create a new `GuidingRecorder`. The vertex storage is cleared.
    ///
    /// * `cache`   - Receives the samples.
    /// * `bounces` - Storage for the vertices.
    pub fn new(cache: &'a GuidingCache, bounces: &'a mut Vec<BounceInfo>) -> Self {
        bounces.clear();
        Self { cache, bounces }
    }

    /// Record incident radiance at a vertex if the vertex is rough enough to learn from.
    ///
    /// * `bounce`   - The vertex.
    /// * `radiance` - Scalar incident radiance along the continuation direction.
    /// * `distance` - Distance to the radiance source.
    fn record(&self, bounce: &BounceInfo, radiance: Float, distance: Float) {
        if bounce.roughness >= self.cache.config.min_roughness && radiance > 0.0 {
            self.cache.add_sample(SampleData::new(
                bounce.position,
                bounce.direction,
                radiance,
                bounce.bxdf_pdf,
                distance,
            ));
        }
    }
}

impl<'a> PathRecorder for GuidingRecorder<'a> {
    fn begin_bounce(&mut self, it: &Interaction) {
        self.bounces.push(BounceInfo::new(it.p(), it.roughness()));
    }

    fn add_direct_lighting(&mut self, value: &Spectrum) {
        if let Some(bounce) = self.bounces.last_mut() {
            bounce.l += *value;
        }
    }

    fn on_scatter(&mut self, it: &Interaction, record: &LocalRecord) {
        if let Some(bounce) = self.bounces.last_mut() {
            bounce.bxdf_weight = record.f / record.pdf;
            bounce.direction = record.wi;
            bounce.bxdf_pdf = record.pdf;
            bounce.distance_factor = it.n().map_or(1.0, |n| compute_distance_factor(&n, &it.wo(), &record.wi));
        }
    }

    fn on_continuation(&mut self, scene: &Scene, distance: Option<Float>, emitted: &Spectrum, misw: Float) {
        let Some(mut bounce) = self.bounces.last().copied() else {
            return;
        };

        if let Some(t) = distance {
            bounce.distance = t;
        }

        if !emitted.is_black() {
            bounce.l += bounce.bxdf_weight * *emitted * misw;

            if self.cache.is_training() {
                let radiance = emitted.average();
                let d = distance.unwrap_or_else(|| {
                    ENVIRONMENT_DISTANCE_SCALE * 0.5 * scene.world_bound().diagonal().length()
                });
                bounce.distance = d;
                self.record(&bounce, radiance, d);
            }
        }

        if let Some(last) = self.bounces.last_mut() {
            *last = bounce;
        }
    }

    fn end_path(&mut self) {
        let n = self.bounces.len();
        if n < 2 || !self.cache.is_training() {
            return;
        }

        let glossy_threshold = self.cache.config.glossy_threshold;
        let mut distance = self.bounces[n - 1].distance;
        for i in (0..n - 1).rev() {
            let next = self.bounces[i + 1];
            let radiance = next.l.average();

            let bounce = &mut self.bounces[i];
            bounce.l += next.l * bounce.bxdf_weight;
            distance = if next.roughness >= glossy_threshold {
                bounce.distance
            } else {
                distance * next.distance_factor + bounce.distance
            };

            let bounce = self.bounces[i];
            self.record(&bounce, radiance, distance);
        }
    }
}

/// Path tracer that learns the incident radiance distribution while rendering and uses it to guide sampling.
pub struct GuidedPathIntegrator {
    /// Distributes the work over threads.
    pub scheduler: RenderScheduler,

    /// The path tracing kernel.
    pub tracer: PathTracer<GuidedStrategy>,

    /// The learned distribution.
    pub cache: Arc<GuidingCache>,
}

impl GuidedPathIntegrator {
    /// Create a new `GuidedPathIntegrator`.
    ///
    /// * `scheduler` - Distributes the work over threads.
    /// * `config`    - Guiding settings.
    pub fn new(scheduler: RenderScheduler, config: GuidingConfig) -> Result<Self, String> {
        let cache = Arc::new(GuidingCache::new(config, scheduler.n_threads)?);
        Ok(Self {
            scheduler,
            tracer: PathTracer::new(GuidedStrategy::new(Arc::clone(&cache))),
            cache,
        })
    }

    /// Trace a camera path and feed its vertices to the cache.
    ///
    /// * `ray`     - The camera ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    fn li_training(&self, ray: Ray, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        BOUNCES.with(|bounces| {
            let mut bounces = bounces.borrow_mut();
            let mut recorder = GuidingRecorder::new(&self.cache, &mut bounces);
            self.tracer.li_recorded(ray, scene, sampler, &mut recorder)
        })
    }
}

impl Integrator for GuidedPathIntegrator {
    fn render(&self, scene: &Scene) {
        let total = self.scheduler.spp;
        let config = self.cache.config;
        let training_spp = config.training_spp(total);
        info!("Guided path tracing {total} spp, {training_spp} spp training");

        if training_spp > 0 {
            self.cache.start_training();
        }

        let mut rendered = 0;
        let mut iteration = 0;
        while rendered < total {
            let spp = min(config.spp_per_iteration, total - rendered);
            if self.cache.is_training() {
                let li = |ray: Ray, scene: &Scene, sampler: &mut dyn Sampler| self.li_training(ray, scene, sampler);
                self.scheduler.render_pass(scene, rendered, spp, &li);
            } else {
                let li = |ray: Ray, scene: &Scene, sampler: &mut dyn Sampler| self.tracer.li(ray, scene, sampler);
                self.scheduler.render_pass(scene, rendered, spp, &li);
            }
            rendered += spp;
            iteration += 1;

            if self.cache.is_training() {
                if !self.cache.end_iteration() {
                    debug!("Iteration {iteration} left the guiding tree unchanged");
                }
                if rendered >= training_spp {
                    self.cache.stop_training();
                    info!("Training finished after {iteration} iterations");
                }
            }
        }
    }

    fn save(&self, path: &str) -> Result<(), String> {
        self.scheduler.film.write_image_to(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn distance_factor_reflection_is_one() {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let wi = Vector3f::new(-0.6, 0.0, 0.8);
        assert_eq!(compute_distance_factor(&n, &wo, &wi), 1.0);
    }

    #[test]
    fn distance_factor_refraction_is_sine_ratio() {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let wi = Vector3f::new(-0.8, 0.0, -0.6);
        assert!(approx_eq!(Float, compute_distance_factor(&n, &wo, &wi), 0.8 / 0.6, epsilon = 1e-5));

        // Normal incidence has no sine to divide by.
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        assert_eq!(compute_distance_factor(&n, &wo, &wi), 1.0);
    }

    #[test]
    fn path_length_limit() {
        let cache = Arc::new(GuidingCache::new(GuidingConfig::default(), 1).unwrap());
        let strategy = GuidedStrategy::new(cache);
        let white = Spectrum::new(1.0);
        assert_eq!(strategy.russian_roulette(&white, 16), 1.0);
        assert_eq!(strategy.russian_roulette(&white, 17), 0.0);
    }

    #[test]
    fn reverse_pass_emits_samples() {
        let cache = GuidingCache::new(GuidingConfig::default(), 1).unwrap();
        cache.start_training();
        let mut storage = Vec::new();
        let mut recorder = GuidingRecorder::new(&cache, &mut storage);

        let mut first = BounceInfo::new(Point3f::zero(), 1.0);
        first.bxdf_weight = Spectrum::new(0.5);
        first.direction = Vector3f::new(0.0, 0.0, 1.0);
        first.bxdf_pdf = 0.3;
        first.distance = 2.0;

        let mut second = BounceInfo::new(Point3f::new(0.0, 0.0, 2.0), 1.0);
        second.l = Spectrum::new(4.0);
        second.distance = 3.0;

        recorder.bounces.push(first);
        recorder.bounces.push(second);
        recorder.end_path();

        assert_eq!(cache.buffer_len(), 1);
        assert!(approx_eq!(Float, recorder.bounces[0].l.average(), 2.0));
    }

    #[test]
    fn smooth_vertices_are_not_recorded() {
        let cache = GuidingCache::new(GuidingConfig::default(), 1).unwrap();
        cache.start_training();
        let mut storage = Vec::new();
        let mut recorder = GuidingRecorder::new(&cache, &mut storage);

        let mut mirror = BounceInfo::new(Point3f::zero(), 0.0);
        mirror.bxdf_weight = Spectrum::new(1.0);
        mirror.direction = Vector3f::new(0.0, 0.0, 1.0);
        mirror.bxdf_pdf = 1.0;
        mirror.distance = 1.0;

        let mut lit = BounceInfo::new(Point3f::new(0.0, 0.0, 1.0), 1.0);
        lit.l = Spectrum::new(1.0);
        lit.distance = 1.0;

        recorder.bounces.push(mirror);
        recorder.bounces.push(lit);
        recorder.end_path();
        assert_eq!(cache.buffer_len(), 0);
    }

    #[test]
    fn glossy_vertex_extends_distance() {
        let cache = GuidingCache::new(GuidingConfig::default(), 1).unwrap();
        cache.start_training();
        let mut storage = Vec::new();
        let mut recorder = GuidingRecorder::new(&cache, &mut storage);

        let mut diffuse = BounceInfo::new(Point3f::zero(), 1.0);
        diffuse.bxdf_weight = Spectrum::new(0.5);
        diffuse.direction = Vector3f::new(0.0, 0.0, 1.0);
        diffuse.bxdf_pdf = 0.3;
        diffuse.distance = 2.0;

        // Rough enough to learn from but below the glossy threshold.
        let mut glossy = BounceInfo::new(Point3f::new(0.0, 0.0, 2.0), 0.1);
        glossy.bxdf_weight = Spectrum::new(1.0);
        glossy.direction = Vector3f::new(0.0, 0.6, 0.8);
        glossy.bxdf_pdf = 2.0;
        glossy.distance = 3.0;
        glossy.distance_factor = 1.5;

        let mut lit = BounceInfo::new(Point3f::new(0.0, 1.8, 4.4), 1.0);
        lit.l = Spectrum::new(4.0);
        lit.distance = 5.0;

        recorder.bounces.push(diffuse);
        recorder.bounces.push(glossy);
        recorder.bounces.push(lit);
        recorder.end_path();

        let samples = cache.buffered_samples();
        assert_eq!(samples.len(), 2);

        // The rough vertex behind the glossy one stops the distance at itself.
        assert!(approx_eq!(Float, samples[0].distance, 3.0));
        assert!(approx_eq!(Float, samples[0].radiance, 4.0));
        assert!(approx_eq!(Float, samples[0].pdf, 2.0));

        // The glossy vertex projects the distance behind it.
        assert!(approx_eq!(Float, samples[1].distance, 3.0 * 1.5 + 2.0));
        assert!(approx_eq!(Float, samples[1].radiance, 4.0));
        assert!(approx_eq!(Float, recorder.bounces[0].l.average(), 2.0));
    }
}
