//! System configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use super::axis::{AxisConfig, AxisTable};
use super::homing::HomingConfig;
use crate::device::Axis;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    /// Stage name for logging.
    #[serde(default)]
    pub name: String<32>,

    /// Homing defaults shared by every axis.
    #[serde(default)]
    pub homing: HomingConfig,

    /// Per-axis overrides.
    #[serde(default)]
    pub axes: AxisTable,
}

impl SystemConfig {
    /// Get the overrides for an axis.
    pub fn axis(&self, axis: Axis) -> Option<&AxisConfig> {
        self.axes.get(axis)
    }

    /// Homing parameters for an axis, with its overrides applied.
    pub fn homing_for(&self, axis: Axis) -> HomingConfig {
        let mut params = self.homing;
        if let Some(overrides) = self.axes.get(axis) {
            if let Some(range) = overrides.range {
                params.range = range;
            }
            if let Some(steps) = overrides.initial_step_size {
                params.initial_step_size = steps;
            }
            if let Some(tolerance) = overrides.tolerance {
                params.tolerance = tolerance;
            }
        }
        params
    }

    /// List configured axes.
    pub fn axis_names(&self) -> impl Iterator<Item = Axis> + '_ {
        self.axes.iter().map(|(axis, _)| axis)
    }
}
