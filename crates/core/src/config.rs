//! Engine tolerances and transmissibility options

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Default coincidence / skew tolerance, in grid length units
pub const DEFAULT_EPSILON: f64 = 1.0;

/// Default vertical scaling applied before distance tests
pub const DEFAULT_Z_SCALE: f64 = 100.0;

/// Configuration of the connection engine
///
/// Fixed for the lifetime of a resolver. Engines that need different
/// tolerances at the same time are simply separate engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance below which two vertices are the same point (scaled metric).
    /// Also the largest gap accepted between two edges that should intersect.
    pub epsilon: f64,

    /// Multiplier applied to vertical (Z) differences before measuring distance.
    /// Grids are thin vertically, so a small Z gap must count as a large one;
    /// the effective vertical tolerance is `epsilon / z_scale`.
    pub z_scale: f64,

    /// Rescale each shared-face normal to the summed area of its fan triangles
    /// instead of the signed polygon area.
    pub precise_area: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            z_scale: DEFAULT_Z_SCALE,
            precise_area: false,
        }
    }
}

impl EngineConfig {
    /// Check tolerances are usable.
    ///
    /// # Errors
    /// `InvalidConfig` if `epsilon` or `z_scale` is not finite and positive.
    pub fn validate(&self) -> GridResult<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        if !self.z_scale.is_finite() || self.z_scale <= 0.0 {
            return Err(GridError::InvalidConfig(format!(
                "z_scale must be finite and positive, got {}",
                self.z_scale
            )));
        }
        Ok(())
    }
}
