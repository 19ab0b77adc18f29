//! Materials

use crate::interaction::*;
use crate::reflection::*;
use std::sync::Arc;

/// Material interface.
pub trait Material {
    /// Returns the scattering functions at a surface point or `None` if the surface only delimits media.
    ///
    /// * `si` - The surface interaction.
    fn compute_bsdf(&self, si: &SurfaceInteraction) -> Option<BSDF>;
}

/// Atomic reference counted `Material`.
pub type ArcMaterial = Arc<dyn Material + Send + Sync>;
