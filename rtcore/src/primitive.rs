//! Primitives

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::material::*;
use crate::medium::*;
use crate::shape::*;
use std::sync::Arc;

/// Primitive interface binding geometry to its appearance.
pub trait Primitive {
    /// Returns the world space bounding box.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the closest intersection in `(0, ray.t_max)` without computing scattering functions.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if the ray intersects the primitive in `(0, ray.t_max)`.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;

/// A shape with a material and optional emission and media.
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The material.
    pub material: ArcMaterial,

    /// Area light emitting from the shape.
    pub area_light: Option<ArcLight>,

    /// Media inside and outside the shape.
    pub medium_interface: Option<MediumInterface>,
}

impl GeometricPrimitive {
    /// Create a new `GeometricPrimitive`.
    ///
    /// * `shape`            - The shape.
    /// * `material`         - The material.
    /// * `area_light`       - Area light emitting from the shape.
    /// * `medium_interface` - Media inside and outside the shape.
    pub fn new(
        shape: ArcShape,
        material: ArcMaterial,
        area_light: Option<ArcLight>,
        medium_interface: Option<MediumInterface>,
    ) -> Self {
        Self {
            shape,
            material,
            area_light,
            medium_interface,
        }
    }
}

impl Primitive for GeometricPrimitive {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let hit = self.shape.intersect(ray)?;
        Some(SurfaceInteraction::new(
            hit.p,
            hit.n,
            -ray.d,
            hit.t,
            Arc::clone(&self.material),
            self.area_light.clone(),
            self.medium_interface.clone(),
        ))
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.shape.intersect_p(ray)
    }
}

/// A brute force aggregate that tests every primitive.
pub struct PrimitiveList {
    /// The primitives.
    primitives: Vec<ArcPrimitive>,

    /// Bounds of all primitives.
    bounds: Bounds3f,
}

impl PrimitiveList {
    /// Create a new `PrimitiveList`.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Vec<ArcPrimitive>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Bounds3f::empty(), |b, p| b.union(&p.world_bound()));
        Self { primitives, bounds }
    }
}

impl Primitive for PrimitiveList {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let mut r = ray.clone();
        let mut closest = None;
        for primitive in self.primitives.iter() {
            if let Some(si) = primitive.intersect(&r) {
                r.t_max = si.t;
                closest = Some(si);
            }
        }
        closest
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.primitives.iter().any(|p| p.intersect_p(ray))
    }
}
