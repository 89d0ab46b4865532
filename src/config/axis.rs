//! Per-axis configuration from TOML.

use serde::Deserialize;

use super::limits::LegalRange;
use super::units::{Hertz, Millimetres, Volts};
use crate::device::Axis;

/// Piezo drive amplitude and rate for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DriveConfig {
    /// Step amplitude.
    pub voltage: Volts,
    /// Step repetition rate.
    pub frequency: Hertz,
}

impl DriveConfig {
    /// Drive used for closed-loop homing when an axis configures none.
    pub const CLOSED_LOOP_DEFAULT: DriveConfig = DriveConfig {
        voltage: Volts(60.0),
        frequency: Hertz(200.0),
    };

    /// Create a new drive setting.
    pub fn new(voltage: Volts, frequency: Hertz) -> Self {
        Self { voltage, frequency }
    }
}

/// Overrides for a single axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct AxisConfig {
    /// Legal range for this axis.
    #[serde(default)]
    pub range: Option<LegalRange>,

    /// Coarsest resolution for this axis.
    #[serde(default)]
    pub initial_step_size: Option<u32>,

    /// Convergence radius for this axis.
    #[serde(default, rename = "tolerance_mm")]
    pub tolerance: Option<Millimetres>,

    /// Drive applied while homing.
    #[serde(default)]
    pub closed_loop: Option<DriveConfig>,

    /// Drive restored after homing.
    #[serde(default)]
    pub open_loop: Option<DriveConfig>,
}

impl AxisConfig {
    /// Drive used during closed-loop homing.
    pub fn closed_loop_drive(&self) -> DriveConfig {
        self.closed_loop.unwrap_or(DriveConfig::CLOSED_LOOP_DEFAULT)
    }
}

/// The `[axes]` table: optional overrides keyed by axis name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct AxisTable {
    /// X axis overrides.
    #[serde(default)]
    pub x: Option<AxisConfig>,
    /// Y axis overrides.
    #[serde(default)]
    pub y: Option<AxisConfig>,
    /// Z axis overrides.
    #[serde(default)]
    pub z: Option<AxisConfig>,
}

impl AxisTable {
    /// Overrides for an axis, if any were configured.
    pub fn get(&self, axis: Axis) -> Option<&AxisConfig> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
            Axis::Z => self.z.as_ref(),
        }
    }

    /// Set overrides for an axis.
    pub fn set(&mut self, axis: Axis, config: AxisConfig) {
        match axis {
            Axis::X => self.x = Some(config),
            Axis::Y => self.y = Some(config),
            Axis::Z => self.z = Some(config),
        }
    }

    /// Iterate over configured axes.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &AxisConfig)> {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|c| (axis, c)))
    }
}
