//! Scatter Strategies

use super::*;
use crate::interaction::*;
use crate::light::*;
use crate::medium::*;
use crate::sampler::*;
use crate::scene::*;

/// Operations a path tracing variant supplies to the shared `PathTracer` loop.
pub trait ScatterStrategy {
    /// Returns radiance emitted towards the ray origin by the surface the ray hit, or by environment lights when
    /// it escaped, along with the density the direct lighting strategy assigns to the same direction.
    ///
    /// * `scene`   - The scene.
    /// * `hit`     - The surface hit, if any.
    /// * `ray`     - The ray.
    /// * `scatter` - Position of the last scattering vertex the ray direction was sampled at.
    fn eval_emittance(
        &self,
        scene: &Scene,
        hit: Option<&SurfaceInteraction>,
        ray: &Ray,
        scatter: &Point3f,
    ) -> LocalRecord;

    /// Sample incident radiance from one light chosen uniformly. The returned density includes the light
    /// selection probability. A blocked shadow ray returns a black record.
    ///
    /// * `scene`   - The scene.
    /// * `it`      - The scattering vertex.
    /// * `ray`     - The ray that arrived at the vertex.
    /// * `sampler` - The sampler.
    fn sample_direct_lighting(
        &self,
        scene: &Scene,
        it: &Interaction,
        ray: &Ray,
        sampler: &mut dyn Sampler,
    ) -> LocalRecord;

    /// Evaluate scattering towards a direction.
    ///
    /// * `it`  - The scattering vertex.
    /// * `ray` - The ray that arrived at the vertex.
    /// * `wi`  - The incident direction.
    fn eval_scatter(&self, it: &Interaction, ray: &Ray, wi: &Vector3f) -> LocalRecord;

    /// Importance sample a continuation direction.
    ///
    /// * `it`      - The scattering vertex.
    /// * `ray`     - The ray that arrived at the vertex.
    /// * `sampler` - The sampler.
    fn sample_scatter(&self, it: &Interaction, ray: &Ray, sampler: &mut dyn Sampler) -> LocalRecord;

    /// Returns the probability in [0, 1] that a path continues.
    ///
    /// * `throughput` - Current path throughput.
    /// * `bounces`    - Number of scattering vertices so far, including the current one.
    fn russian_roulette(&self, throughput: &Spectrum, bounces: usize) -> Float;

    /// Sample a scattering distance in the medium the ray travels through, up to `ray.t_max`. Strategies that
    /// ignore participating media return `None`.
    ///
    /// * `medium`  - The medium of the ray.
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample_medium(&self, _medium: &ArcMedium, _ray: &Ray, _sampler: &mut dyn Sampler) -> Option<MediumSample> {
        None
    }
}

/// Choose one light uniformly. Returns the light and the selection probability.
///
/// * `scene` - The scene.
/// * `u`     - Sample value in [0, 1).
pub fn choose_light(scene: &Scene, u: Float) -> Option<(&ArcLight, Float)> {
    let lights = scene.get_lights();
    if lights.is_empty() {
        return None;
    }
    let n = lights.len();
    let index = min((u * n as Float) as usize, n - 1);
    Some((&lights[index], 1.0 / n as Float))
}

/// Returns the probability of choosing one specific light with `choose_light()`.
///
/// * `scene` - The scene.
pub fn light_choice_pdf(scene: &Scene) -> Float {
    let n = scene.get_lights().len();
    if n == 0 {
        0.0
    } else {
        1.0 / n as Float
    }
}

/// Evaluate emission shared by all strategies: the area light of a hit surface or the sum of all environment
/// lights for escaped rays. Densities include the light selection probability.
///
/// * `scene`   - The scene.
/// * `hit`     - The surface hit, if any.
/// * `ray`     - The ray.
/// * `scatter` - Position of the last scattering vertex.
pub fn eval_light_emittance(
    scene: &Scene,
    hit: Option<&SurfaceInteraction>,
    ray: &Ray,
    scatter: &Point3f,
) -> LocalRecord {
    let choice_pdf = light_choice_pdf(scene);
    match hit {
        Some(si) => match &si.area_light {
            Some(light) => {
                let le = light.eval(scatter, si);
                LocalRecord::new(-ray.d, le.value, le.pdf * choice_pdf, false)
            }
            None => LocalRecord::black(),
        },
        None => {
            let mut record = LocalRecord::new(-ray.d, Spectrum::default(), 0.0, false);
            for light in scene.infinite_lights.iter() {
                let le = light.eval_environment(ray);
                record.f += le.value;
                record.pdf += le.pdf * choice_pdf;
            }
            record
        }
    }
}
