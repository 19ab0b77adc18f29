//! Local Records

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;

/// Result of one emission, lighting or scattering query made by the path tracing kernel.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalRecord {
    /// Direction of the query; incident direction for lighting and scattering.
    pub wi: Vector3f,

    /// Throughput factor: emitted or incident radiance, `f·|cosθ|` for surfaces or the phase value for media.
    pub f: Spectrum,

    /// Solid angle density; combined discrete and continuous density for light samples.
    pub pdf: Float,

    /// Whether the value comes from a delta distribution.
    pub is_delta: bool,
}

impl LocalRecord {
    /// Create a new `LocalRecord`.
    ///
    /// * `wi`       - Direction of the query.
    /// * `f`        - Throughput factor.
    /// * `pdf`      - Solid angle density.
    /// * `is_delta` - Whether the value comes from a delta distribution.
    pub fn new(wi: Vector3f, f: Spectrum, pdf: Float, is_delta: bool) -> Self {
        Self { wi, f, pdf, is_delta }
    }

    /// Returns a record that carries no contribution.
    pub fn black() -> Self {
        Self::default()
    }

    /// Returns `true` if the record carries no contribution.
    pub fn is_black(&self) -> bool {
        self.f.is_black()
    }
}
