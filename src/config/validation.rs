//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::axis::{AxisConfig, DriveConfig};
use super::{HomingConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Homing defaults are usable (step size, tolerance, range, bounds)
/// - Every axis override, merged with the defaults, is usable
/// - Drive settings are within the stage controller's limits
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_homing(&config.homing)?;

    for (axis, overrides) in config.axes.iter() {
        validate_axis(overrides)?;
        validate_homing(&config.homing_for(axis))?;
    }

    Ok(())
}

/// Validate one set of homing parameters.
pub fn validate_homing(config: &HomingConfig) -> Result<()> {
    if config.initial_step_size == 0 {
        return Err(Error::Config(ConfigError::InvalidStepSize(0)));
    }

    if !config.tolerance.is_finite() || config.tolerance.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidTolerance(
            config.tolerance.0,
        )));
    }

    if !config.range.is_valid() {
        return Err(Error::Config(ConfigError::InvalidRange {
            min: config.range.min.0,
            max: config.range.max.0,
        }));
    }

    if config.max_iterations_per_attempt == 0 {
        return Err(Error::Config(ConfigError::InvalidIterationLimit(0)));
    }

    let gap = config.flip_confirmation_gap;
    if !gap.is_finite() || gap.0 < 0.0 {
        return Err(Error::Config(ConfigError::InvalidConfirmationGap(gap.0)));
    }

    if config.stall_window == Some(0) {
        return Err(Error::Config(ConfigError::InvalidStallWindow(0)));
    }

    Ok(())
}

fn validate_axis(config: &AxisConfig) -> Result<()> {
    if let Some(ref drive) = config.closed_loop {
        validate_drive(drive)?;
    }
    if let Some(ref drive) = config.open_loop {
        validate_drive(drive)?;
    }
    Ok(())
}

fn validate_drive(drive: &DriveConfig) -> Result<()> {
    if !drive.voltage.is_valid() {
        return Err(Error::Config(ConfigError::InvalidVoltage(drive.voltage.0)));
    }
    if !drive.frequency.is_valid() {
        return Err(Error::Config(ConfigError::InvalidFrequency(
            drive.frequency.0,
        )));
    }
    Ok(())
}
