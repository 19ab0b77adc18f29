//! Materials

mod conductor;
mod glass;
mod matte;
mod mirror;
mod null;

// Re-export
pub use conductor::*;
pub use glass::*;
pub use matte::*;
pub use mirror::*;
pub use null::*;

#[cfg(test)]
pub(crate) mod test_utils {
    use rtcore::geometry::*;
    use rtcore::interaction::*;
    use rtcore::material::*;

    /// Returns a hit on the plane z = 0 seen from above.
    ///
    /// * `material` - The material at the hit.
    pub fn hit_from_above(material: ArcMaterial) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::new(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            1.0,
            material,
            None,
            None,
        );
        si.compute_scattering_functions();
        si
    }
}
