//! Null Material

use rtcore::interaction::*;
use rtcore::material::*;
use rtcore::reflection::*;

/// An invisible surface that only marks the boundary between two media.
#[derive(Default)]
pub struct NullMaterial;

impl NullMaterial {
    /// Create a new `NullMaterial`.
    pub fn new() -> Self {
        Self
    }
}

impl Material for NullMaterial {
    fn compute_bsdf(&self, _si: &SurfaceInteraction) -> Option<BSDF> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use std::sync::Arc;

    #[test]
    fn has_no_bsdf() {
        let si = hit_from_above(Arc::new(NullMaterial::new()));
        assert!(si.is_null());
        assert!(si.bsdf.is_none());
    }
}
