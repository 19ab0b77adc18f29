//! Scene

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::primitive::*;

/// Scene geometry and lights.
pub struct Scene {
    /// Aggregate of all primitives.
    pub aggregate: ArcPrimitive,

    /// All light sources.
    pub lights: Vec<ArcLight>,

    /// Lights that contribute to rays escaping the scene.
    pub infinite_lights: Vec<ArcLight>,

    /// World space bounding box of the geometry.
    world_bound: Bounds3f,
}

impl Scene {
    /// Create a new `Scene`.
    ///
    /// * `aggregate` - Aggregate of all primitives.
    /// * `lights`    - All light sources.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        let world_bound = aggregate.world_bound();
        let infinite_lights: Vec<ArcLight> = lights
            .iter()
            .filter(|light| light.get_type().contains(LightType::INFINITE_LIGHT))
            .cloned()
            .collect();

        info!(
            "Scene with {} lights ({} infinite), bounds {:?}",
            lights.len(),
            infinite_lights.len(),
            world_bound
        );

        Self {
            aggregate,
            lights,
            infinite_lights,
            world_bound,
        }
    }

    /// Returns the world space bounding box of the geometry.
    pub fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }

    /// Returns all light sources.
    pub fn get_lights(&self) -> &[ArcLight] {
        &self.lights
    }

    /// Returns the closest intersection with scattering functions computed.
    ///
    /// * `ray` - The ray.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let mut si = self.aggregate.intersect(ray)?;
        si.compute_scattering_functions();
        Some(si)
    }

    /// Returns `true` if anything intersects the ray.
    ///
    /// * `ray` - The ray.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.aggregate.intersect_p(ray)
    }
}
