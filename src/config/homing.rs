//! Closed-loop homing parameters from TOML.

use serde::Deserialize;

use super::limits::LegalRange;
use super::units::Millimetres;

/// Parameters for one closed-loop homing request.
///
/// The `[homing]` table supplies defaults for every axis; `[axes.<axis>]`
/// tables may override some of them (see [`SystemConfig::homing_for`]).
///
/// [`SystemConfig::homing_for`]: super::SystemConfig::homing_for
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Coarsest resolution tried, in actuator steps per move.
    pub initial_step_size: u32,

    /// Convergence radius around the target.
    #[serde(rename = "tolerance_mm")]
    pub tolerance: Millimetres,

    /// Targets outside this interval are rejected.
    pub range: LegalRange,

    /// Wait after each actuation before reading the position back.
    pub settling_delay_ms: u32,

    /// Actuations allowed per resolution level before declaring a stall.
    pub max_iterations_per_attempt: u32,

    /// Crossings of the target smaller than this are confirmed with a second
    /// read before being treated as an overshoot. Zero disables the guard.
    #[serde(rename = "flip_confirmation_gap_mm")]
    pub flip_confirmation_gap: Millimetres,

    /// Consecutive actuations advancing less than `tolerance` that count as a
    /// stall. `None` leaves only the iteration bound.
    pub stall_window: Option<u32>,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            initial_step_size: 100,
            tolerance: Millimetres(0.001),
            range: LegalRange::default(),
            settling_delay_ms: 10,
            max_iterations_per_attempt: 500,
            flip_confirmation_gap: Millimetres(0.0),
            stall_window: None,
        }
    }
}

impl HomingConfig {
    /// Copy with a different coarsest resolution.
    pub fn with_initial_step_size(mut self, steps: u32) -> Self {
        self.initial_step_size = steps;
        self
    }

    /// Copy with a different tolerance.
    pub fn with_tolerance(mut self, tolerance: Millimetres) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Copy with a different legal range.
    pub fn with_range(mut self, range: LegalRange) -> Self {
        self.range = range;
        self
    }

    /// Copy with a different settling delay.
    pub fn with_settling_delay_ms(mut self, ms: u32) -> Self {
        self.settling_delay_ms = ms;
        self
    }

    /// Copy with a different per-attempt iteration bound.
    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations_per_attempt = iterations;
        self
    }

    /// Copy with a different flip confirmation gap.
    pub fn with_flip_confirmation_gap(mut self, gap: Millimetres) -> Self {
        self.flip_confirmation_gap = gap;
        self
    }

    /// Copy with a different stall window.
    pub fn with_stall_window(mut self, window: Option<u32>) -> Self {
        self.stall_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HomingConfig::default();

        assert_eq!(config.initial_step_size, 100);
        assert!((config.tolerance.0 - 0.001).abs() < 1e-12);
        assert_eq!(config.range, LegalRange::default());
        assert_eq!(config.settling_delay_ms, 10);
        assert_eq!(config.stall_window, None);
    }

    #[test]
    fn test_with_overrides_leave_original_untouched() {
        let base = HomingConfig::default();
        let tuned = base.with_initial_step_size(40).with_stall_window(Some(4));

        assert_eq!(base.initial_step_size, 100);
        assert_eq!(tuned.initial_step_size, 40);
        assert_eq!(tuned.stall_window, Some(4));
    }
}
