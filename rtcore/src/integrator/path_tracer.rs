//! Path Tracing Kernel

use super::*;
use crate::interaction::*;
use crate::sampler::*;
use crate::sampling::*;
use crate::scene::*;

/// Walking state of one camera path.
#[derive(Clone, Debug)]
pub struct PathState {
    /// The current ray.
    pub ray: Ray,

    /// Product of scattering weights along the path.
    pub throughput: Spectrum,

    /// Number of scattering vertices so far.
    pub bounces: usize,

    /// Density of the last sampled direction; infinite for the camera ray.
    pub pdf_last_scatter: Float,

    /// Whether the last sampled direction came from a delta distribution.
    pub is_last_delta: bool,

    /// Position of the last scattering vertex.
    pub last_scatter_p: Point3f,
}

impl PathState {
    /// Start a new path.
    ///
    /// * `ray` - The camera ray.
    pub fn new(ray: Ray) -> Self {
        let last_scatter_p = ray.o;
        Self {
            ray,
            throughput: Spectrum::new(1.0),
            bounces: 0,
            pdf_last_scatter: INFINITY,
            is_last_delta: false,
            last_scatter_p,
        }
    }
}

/// Observes a path while the kernel walks it. All hooks default to doing nothing.
pub trait PathRecorder {
    /// A new scattering vertex survived Russian roulette.
    ///
    /// * `it` - The vertex.
    fn begin_bounce(&mut self, _it: &Interaction) {}

    /// Direct lighting reflected towards the previous vertex, not weighted by the path throughput.
    ///
    /// * `value` - The contribution.
    fn add_direct_lighting(&mut self, _value: &Spectrum) {}

    /// A continuation direction was sampled at the current vertex.
    ///
    /// * `it`     - The vertex.
    /// * `record` - The scatter sample.
    fn on_scatter(&mut self, _it: &Interaction, _record: &LocalRecord) {}

    /// The continuation ray of the current vertex found its next vertex or escaped.
    ///
    /// * `scene`    - The scene.
    /// * `distance` - Distance to the next vertex; `None` when the ray escaped.
    /// * `emitted`  - Emission found along the ray.
    /// * `misw`     - MIS weight applied to the emission.
    fn on_continuation(&mut self, _scene: &Scene, _distance: Option<Float>, _emitted: &Spectrum, _misw: Float) {}

    /// The path terminated.
    fn end_path(&mut self) {}
}

impl PathRecorder for () {}

/// Unidirectional path tracer with next event estimation, multiple importance sampling and Russian roulette.
/// The variant specific operations come from a `ScatterStrategy`.
pub struct PathTracer<S: ScatterStrategy> {
    /// The strategy.
    pub strategy: S,

    /// Number of light samples taken at each vertex.
    pub n_direct_light_samples: usize,

    /// Exponent of the power heuristic.
    pub mis_power: Float,

    /// Hard limit on the number of scattering vertices.
    pub max_bounces: Option<usize>,
}

impl<S: ScatterStrategy> PathTracer<S> {
    /// Create a new `PathTracer` with one light sample per vertex and the balance heuristic.
    ///
    /// * `strategy` - The strategy.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            n_direct_light_samples: 1,
            mis_power: 1.0,
            max_bounces: None,
        }
    }

    /// Returns the MIS weight of a sample from strategy `a` competing with strategy `b`.
    ///
    /// * `pdf_a` - Density of the strategy that produced the sample.
    /// * `pdf_b` - Density of the competing strategy.
    #[inline]
    pub fn mis_weight(&self, pdf_a: Float, pdf_b: Float) -> Float {
        mis_weight(pdf_a, pdf_b, self.mis_power)
    }

    /// Returns the radiance arriving along a camera ray.
    ///
    /// * `ray`     - The camera ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    pub fn li(&self, ray: Ray, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        self.li_recorded(ray, scene, sampler, &mut ())
    }

    /// Returns the radiance arriving along a camera ray while reporting the path to a recorder.
    ///
    /// * `ray`      - The camera ray.
    /// * `scene`    - The scene.
    /// * `sampler`  - The sampler.
    /// * `recorder` - Observer of the path.
    pub fn li_recorded<R: PathRecorder>(
        &self,
        ray: Ray,
        scene: &Scene,
        sampler: &mut dyn Sampler,
        recorder: &mut R,
    ) -> Spectrum {
        let mut l = Spectrum::default();
        let mut state = PathState::new(ray);
        let mut awaiting_continuation = false;
        // Distance covered by the continuation ray across medium boundaries.
        let mut travelled = 0.0;

        loop {
            let hit = scene.intersect(&state.ray);
            if let Some(si) = hit.as_ref() {
                state.ray.t_max = si.t;
            }

            // Participating media along the ray segment.
            let mut medium_event = None;
            if let Some(medium) = state.ray.medium.clone() {
                if let Some(ms) = self.strategy.sample_medium(&medium, &state.ray, sampler) {
                    state.throughput *= ms.weight;
                    if state.throughput.is_black() {
                        break;
                    }
                    if let Some(t) = ms.t {
                        medium_event = Some(MediumInteraction::new(state.ray.at(t), -state.ray.d, medium));
                    }
                }
            }

            let it = match medium_event {
                Some(mi) => {
                    if awaiting_continuation {
                        let distance = travelled + (mi.p - state.ray.o).length();
                        recorder.on_continuation(scene, Some(distance), &Spectrum::default(), 0.0);
                    }
                    Interaction::Medium(mi)
                }
                None => {
                    let emitted = self.strategy.eval_emittance(scene, hit.as_ref(), &state.ray, &state.last_scatter_p);
                    let mut misw = 0.0;
                    if !emitted.is_black() {
                        misw = if state.is_last_delta {
                            1.0
                        } else {
                            self.mis_weight(state.pdf_last_scatter, emitted.pdf)
                        };
                        l += state.throughput * emitted.f * misw;
                    }

                    // Medium boundaries are crossed without counting a bounce.
                    if let Some(si) = hit.as_ref().filter(|si| si.is_null()) {
                        travelled += si.t;
                        state.ray = si.spawn_ray(&state.ray.d, &state.ray.medium);
                        continue;
                    }

                    if awaiting_continuation {
                        let distance = hit.as_ref().map(|si| travelled + si.t);
                        recorder.on_continuation(scene, distance, &emitted.f, misw);
                    }

                    let si = match hit {
                        Some(si) => si,
                        None => break,
                    };

                    Interaction::Surface(si)
                }
            };

            state.bounces += 1;
            if self.max_bounces.map_or(false, |max| state.bounces > max) {
                break;
            }

            let p_survive = self.strategy.russian_roulette(&state.throughput, state.bounces);
            if p_survive < 1.0 {
                if p_survive <= 0.0 || sampler.get_1d() >= p_survive {
                    break;
                }
                state.throughput /= p_survive;
            }

            recorder.begin_bounce(&it);

            // Next event estimation.
            for _ in 0..self.n_direct_light_samples {
                let light = self.strategy.sample_direct_lighting(scene, &it, &state.ray, sampler);
                if light.is_black() || light.pdf <= 0.0 {
                    continue;
                }
                let scatter = self.strategy.eval_scatter(&it, &state.ray, &light.wi);
                if scatter.is_black() {
                    continue;
                }

                let misw = if light.is_delta {
                    1.0
                } else {
                    self.mis_weight(light.pdf, scatter.pdf)
                };
                let value = light.f * scatter.f * (misw / (light.pdf * self.n_direct_light_samples as Float));
                l += state.throughput * value;
                recorder.add_direct_lighting(&value);
            }

            // Continuation.
            let scatter = self.strategy.sample_scatter(&it, &state.ray, sampler);
            if scatter.is_black() || scatter.pdf <= 0.0 {
                break;
            }
            recorder.on_scatter(&it, &scatter);

            state.throughput *= scatter.f / scatter.pdf;
            state.pdf_last_scatter = scatter.pdf;
            state.is_last_delta = scatter.is_delta;
            state.last_scatter_p = it.p();
            state.ray = it.spawn_ray(&scatter.wi, &state.ray.medium);
            awaiting_continuation = true;
            travelled = 0.0;

            debug!(
                "Bounce {} at {:?}, wi {:?}, pdf {}",
                state.bounces,
                state.last_scatter_p,
                scatter.wi,
                scatter.pdf
            );
        }

        recorder.end_path();
        l
    }
}
