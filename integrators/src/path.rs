//! Path Integrator

use rtcore::geometry::*;
use rtcore::integrator::*;
use rtcore::interaction::*;
use rtcore::pbrt::*;
use rtcore::sampler::*;
use rtcore::scene::*;
use rtcore::spectrum::*;

/// Path length up to which paths always survive Russian roulette.
pub const DEFAULT_RR_PATH_LIMIT: usize = 20;

/// Paths longer than this are terminated.
pub const DEFAULT_PATH_LENGTH_LIMIT: usize = 20;

/// Survival probability of paths longer than the limit.
pub const DEFAULT_RR_SURVIVAL: Float = 0.95;

/// Scatter strategy for scenes without participating media.
#[derive(Copy, Clone, Debug)]
pub struct SurfaceStrategy {
    /// Paths longer than this are terminated.
    pub path_length_limit: usize,

    /// Paths up to this many bounces always survive Russian roulette.
    pub rr_path_limit: usize,

    /// Survival probability between `rr_path_limit` and `path_length_limit`.
    pub rr_survival: Float,
}

impl Default for SurfaceStrategy {
    fn default() -> Self {
        Self {
            path_length_limit: DEFAULT_PATH_LENGTH_LIMIT,
            rr_path_limit: DEFAULT_RR_PATH_LIMIT,
            rr_survival: DEFAULT_RR_SURVIVAL,
        }
    }
}

impl ScatterStrategy for SurfaceStrategy {
    fn eval_emittance(
        &self,
        scene: &Scene,
        hit: Option<&SurfaceInteraction>,
        ray: &Ray,
        scatter: &Point3f,
    ) -> LocalRecord {
        eval_light_emittance(scene, hit, ray, scatter)
    }

    fn sample_direct_lighting(
        &self,
        scene: &Scene,
        it: &Interaction,
        ray: &Ray,
        sampler: &mut dyn Sampler,
    ) -> LocalRecord {
        let (light, choice_pdf) = match choose_light(scene, sampler.get_1d()) {
            Some(choice) => choice,
            None => return LocalRecord::black(),
        };
        let ls = match light.sample_direct(&it.p(), &sampler.get_2d()) {
            Some(ls) => ls,
            None => return LocalRecord::black(),
        };

        let shadow_ray = it.spawn_shadow_ray(&ls.wi, ls.distance, &ray.medium);
        if scene.intersect_p(&shadow_ray) {
            return LocalRecord::black();
        }
        LocalRecord::new(ls.wi, ls.value, ls.pdf * choice_pdf, ls.is_delta)
    }

    fn eval_scatter(&self, it: &Interaction, _ray: &Ray, wi: &Vector3f) -> LocalRecord {
        eval_local_scatter(it, wi)
    }

    fn sample_scatter(&self, it: &Interaction, _ray: &Ray, sampler: &mut dyn Sampler) -> LocalRecord {
        sample_local_scatter(it, sampler)
    }

    fn russian_roulette(&self, _throughput: &Spectrum, bounces: usize) -> Float {
        if bounces > self.path_length_limit {
            0.0
        } else if bounces <= self.rr_path_limit {
            1.0
        } else {
            self.rr_survival
        }
    }
}

/// Evaluate the BSDF (weighted by `|cosθ|`) or the phase function at an interaction.
///
/// * `it` - The interaction.
/// * `wi` - The incident direction.
pub fn eval_local_scatter(it: &Interaction, wi: &Vector3f) -> LocalRecord {
    match it {
        Interaction::Surface(si) => match si.bsdf.as_ref() {
            Some(bsdf) => {
                let f = bsdf.f(&si.wo, wi) * wi.abs_dot(&si.n);
                let pdf = bsdf.pdf(&si.wo, wi);
                LocalRecord::new(*wi, f, pdf, false)
            }
            None => LocalRecord::black(),
        },
        Interaction::Medium(mi) => {
            let p = mi.phase.p(&mi.wo, wi);
            LocalRecord::new(*wi, Spectrum::new(p), p, false)
        }
    }
}

/// Importance sample the BSDF or the phase function at an interaction.
///
/// * `it`      - The interaction.
/// * `sampler` - The sampler.
pub fn sample_local_scatter(it: &Interaction, sampler: &mut dyn Sampler) -> LocalRecord {
    match it {
        Interaction::Surface(si) => {
            let bsdf = match si.bsdf.as_ref() {
                Some(bsdf) => bsdf,
                None => return LocalRecord::black(),
            };
            match bsdf.sample_f(&si.wo, &sampler.get_2d()) {
                Some(bs) => LocalRecord::new(bs.wi, bs.f * bs.wi.abs_dot(&si.n), bs.pdf, bs.is_specular()),
                None => LocalRecord::black(),
            }
        }
        Interaction::Medium(mi) => {
            let (p, wi) = mi.phase.sample_p(&mi.wo, &sampler.get_2d());
            LocalRecord::new(wi, Spectrum::new(p), p, false)
        }
    }
}

/// Implements path tracing for surfaces with next event estimation.
pub struct PathIntegrator {
    /// Distributes the work over threads.
    pub scheduler: RenderScheduler,

    /// The path tracing kernel.
    pub tracer: PathTracer<SurfaceStrategy>,
}

impl PathIntegrator {
    /// Create a new `PathIntegrator`.
    ///
    /// * `scheduler` - Distributes the work over threads.
    /// * `strategy`  - Russian roulette settings.
    pub fn new(scheduler: RenderScheduler, strategy: SurfaceStrategy) -> Self {
        Self {
            scheduler,
            tracer: PathTracer::new(strategy),
        }
    }
}

impl Integrator for PathIntegrator {
    fn render(&self, scene: &Scene) {
        info!("Path tracing {} spp", self.scheduler.spp);
        let li = |ray: Ray, scene: &Scene, sampler: &mut dyn Sampler| self.tracer.li(ray, scene, sampler);
        self.scheduler.render(scene, &li);
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
    fn russian_roulette_schedule() {
        let strategy = SurfaceStrategy::default();
        let white = Spectrum::new(1.0);
        assert_eq!(strategy.russian_roulette(&white, 1), 1.0);
        assert_eq!(strategy.russian_roulette(&white, 20), 1.0);
        assert_eq!(strategy.russian_roulette(&white, 21), 0.0);
        assert_eq!(strategy.russian_roulette(&white, 1000), 0.0);

        let strategy = SurfaceStrategy {
            path_length_limit: 30,
            ..Default::default()
        };
        assert!(approx_eq!(Float, strategy.russian_roulette(&white, 21), 0.95));
        assert_eq!(strategy.russian_roulette(&white, 31), 0.0);
    }
}
