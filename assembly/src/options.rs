//! Assembly options
//!
//! Loaded from the `[assembly]` table of `assemble.toml` by the CLI, or built
//! directly by callers. Every field has a default so partial tables work.

use serde::{Deserialize, Serialize};

/// Default bone influence bound per vertex
pub const DEFAULT_MAX_BONE_INFLUENCES: usize = 4;

/// Options recognized by [`assemble_content`](crate::assemble_content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Influences kept per skinned vertex after sorting by weight (default: 4)
    #[serde(default = "default_max_influences")]
    pub max_bone_influences_per_vertex: usize,

    /// Reserved for approximate welding. Welding is exact-match only and
    /// ignores this value.
    #[serde(default)]
    pub weld_epsilon: f32,

    /// Rotate root transforms so consumers always receive Y-up data (default: true)
    #[serde(default = "default_true")]
    pub up_axis_normalization: bool,

    /// Scale translations and positions into meters (default: true)
    #[serde(default = "default_true")]
    pub unit_scale_normalization: bool,

    /// Process geometries and clips on the rayon pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_max_influences() -> usize {
    DEFAULT_MAX_BONE_INFLUENCES
}

fn default_true() -> bool {
    true
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            max_bone_influences_per_vertex: default_max_influences(),
            weld_epsilon: 0.0,
            up_axis_normalization: true,
            unit_scale_normalization: true,
            parallel: true,
        }
    }
}

impl AssemblyOptions {
    /// Influence bound actually applied; zero is treated as one
    pub fn max_influences(&self) -> usize {
        self.max_bone_influences_per_vertex.max(1)
    }

    /// Multiplier applied to translations for a document declaring `meter`
    pub fn unit_scale(&self, meter: f32) -> f32 {
        if self.unit_scale_normalization && meter.is_finite() && meter > 0.0 {
            meter
        } else {
            1.0
        }
    }
}
