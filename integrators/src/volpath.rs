//! Volumetric Path Integrator

use crate::path::*;
use rtcore::geometry::*;
use rtcore::integrator::*;
use rtcore::interaction::*;
use rtcore::medium::*;
use rtcore::pbrt::*;
use rtcore::sampler::*;
use rtcore::scene::*;
use rtcore::spectrum::*;

/// Upper bound on the medium boundaries a shadow ray may cross.
const MAX_SHADOW_CROSSINGS: usize = 256;

/// Scatter strategy for scenes with participating media bounded by null surfaces.
#[derive(Copy, Clone, Debug)]
pub struct VolumeStrategy {
    /// Paths longer than this are terminated.
    pub path_length_limit: usize,

    /// Paths up to this many bounces always survive Russian roulette.
    pub rr_min_bounces: usize,

    /// Survival probability between `rr_min_bounces` and `path_length_limit`.
    pub rr_survival: Float,
}

impl Default for VolumeStrategy {
    fn default() -> Self {
        Self {
            path_length_limit: 20,
            rr_min_bounces: 2,
            rr_survival: DEFAULT_RR_SURVIVAL,
        }
    }
}

impl VolumeStrategy {
    /// Returns the transmittance along a shadow ray. Null surfaces are crossed while accumulating the
    /// transmittance of the media between them. Any other surface blocks the ray.
    ///
    /// * `scene`   - The scene.
    /// * `ray`     - The shadow ray.
    /// * `sampler` - The sampler.
    pub fn eval_transmittance(&self, scene: &Scene, mut ray: Ray, sampler: &mut dyn Sampler) -> Spectrum {
        let mut tr = Spectrum::new(1.0);

        for _ in 0..MAX_SHADOW_CROSSINGS {
            let hit = scene.intersect(&ray);

            if let Some(medium) = ray.medium.as_ref() {
                let mut segment = ray.clone();
                segment.t_max = hit.as_ref().map_or(ray.t_max, |si| si.t);
                tr *= medium.eval_transmittance(&segment, sampler);
            }

            let si = match hit {
                Some(si) => si,
                None => return tr,
            };
            if !si.is_null() || tr.is_black() {
                return Spectrum::default();
            }

            let medium = si.get_medium(&ray.d, &ray.medium);
            ray = Ray::new(si.offset_origin(&ray.d), ray.d, ray.t_max - si.t, medium);
        }

        warn!("Shadow ray crossed more than {MAX_SHADOW_CROSSINGS} medium boundaries");
        Spectrum::default()
    }
}

impl ScatterStrategy for VolumeStrategy {
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
        let tr = self.eval_transmittance(scene, shadow_ray, sampler);
        if tr.is_black() {
            return LocalRecord::black();
        }
        LocalRecord::new(ls.wi, ls.value * tr, ls.pdf * choice_pdf, ls.is_delta)
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
        } else if bounces <= self.rr_min_bounces {
            1.0
        } else {
            self.rr_survival
        }
    }

    fn sample_medium(&self, medium: &ArcMedium, ray: &Ray, sampler: &mut dyn Sampler) -> Option<MediumSample> {
        Some(medium.sample_distance(ray, sampler))
    }
}

/// Implements volumetric light transport path tracing.
pub struct VolPathIntegrator {
    /// Distributes the work over threads.
    pub scheduler: RenderScheduler,

    /// The path tracing kernel.
    pub tracer: PathTracer<VolumeStrategy>,
}

impl VolPathIntegrator {
    /// Create a new `VolPathIntegrator`.
    ///
    /// * `scheduler` - Distributes the work over threads.
    /// * `strategy`  - Path length and Russian roulette settings.
    pub fn new(scheduler: RenderScheduler, strategy: VolumeStrategy) -> Self {
        Self {
            scheduler,
            tracer: PathTracer::new(strategy),
        }
    }
}

impl Integrator for VolPathIntegrator {
    fn render(&self, scene: &Scene) {
        info!("Volumetric path tracing {} spp", self.scheduler.spp);
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

    #[test]
    fn russian_roulette_schedule() {
        let strategy = VolumeStrategy::default();
        let white = Spectrum::new(1.0);
        assert_eq!(strategy.russian_roulette(&white, 2), 1.0);
        assert_eq!(strategy.russian_roulette(&white, 3), 0.95);
        assert_eq!(strategy.russian_roulette(&white, 21), 0.0);
    }
}
