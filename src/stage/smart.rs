//! Closed-loop stage.
//!
//! Generic over the step actuator, position readout and delay provider.

use embedded_hal::delay::DelayNs;

use crate::config::units::Millimetres;
use crate::config::{DriveConfig, HomingConfig, SystemConfig};
use crate::device::{Actuator, Axis, Direction, DriveSettings, PositionSensor};
use crate::error::HomingError;
use crate::homing::{CancelFlag, HomingController, HomingOutcome, MovePast};

use super::builder::SmartStageBuilder;
use super::session::StageSession;

static NEVER_CANCELLED: CancelFlag = CancelFlag::new();

/// A piezo stage with absolute readout, driven closed-loop.
///
/// Owns the instruments for its lifetime; all motion goes through `&mut self`
/// so one homing request runs at a time.
pub struct SmartStage<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    /// Instruments.
    session: StageSession<A, S, D>,

    /// Validated configuration.
    config: SystemConfig,
}

impl<A, S, D> SmartStage<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    /// Create a stage from a session and an already validated configuration.
    pub(crate) fn new(session: StageSession<A, S, D>, config: SystemConfig) -> Self {
        Self { session, config }
    }

    /// Start building a stage.
    pub fn builder() -> SmartStageBuilder<A, S, D> {
        SmartStageBuilder::new()
    }

    /// Get the stage name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name.as_str()
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Homing parameters for an axis, with its overrides applied.
    #[inline]
    pub fn homing_params(&self, axis: Axis) -> HomingConfig {
        self.config.homing_for(axis)
    }

    /// Mutable access to the instruments.
    #[inline]
    pub fn session_mut(&mut self) -> &mut StageSession<A, S, D> {
        &mut self.session
    }

    /// Read the current position of an axis.
    pub fn position(&mut self, axis: Axis) -> Result<Millimetres, HomingError> {
        Ok(self.session.read(axis)?)
    }

    /// Fire `count` open-loop steps without reading back.
    pub fn jog(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), HomingError> {
        if count == 0 {
            return Ok(());
        }
        self.session.step(axis, direction, count)?;
        Ok(())
    }

    /// Drive an axis to `target` with the configured parameters.
    pub fn move_to(&mut self, axis: Axis, target: Millimetres) -> Result<HomingOutcome, HomingError> {
        let params = self.homing_params(axis);
        self.home(axis, target, params, &NEVER_CANCELLED)
    }

    /// Drive an axis to `target` starting from a different coarsest
    /// resolution.
    pub fn move_to_from(
        &mut self,
        axis: Axis,
        target: Millimetres,
        initial_step_size: u32,
    ) -> Result<HomingOutcome, HomingError> {
        let params = self.homing_params(axis).with_initial_step_size(initial_step_size);
        self.home(axis, target, params, &NEVER_CANCELLED)
    }

    /// Drive an axis to `target`, aborting when `cancel` is set.
    pub fn move_to_cancellable(
        &mut self,
        axis: Axis,
        target: Millimetres,
        cancel: &CancelFlag,
    ) -> Result<HomingOutcome, HomingError> {
        let params = self.homing_params(axis);
        self.home(axis, target, params, cancel)
    }

    /// Drive an axis to `target` with explicit parameters.
    ///
    /// Per-axis overrides from the configuration are not applied.
    pub fn home(
        &mut self,
        axis: Axis,
        target: Millimetres,
        params: HomingConfig,
        cancel: &CancelFlag,
    ) -> Result<HomingOutcome, HomingError> {
        HomingController::new(params)?.move_to(&mut self.session, axis, target, cancel)
    }

    /// Step `clicks` at a time until the reading reaches or passes `target`.
    pub fn move_past(
        &mut self,
        axis: Axis,
        target: Millimetres,
        clicks: u32,
    ) -> Result<MovePast, HomingError> {
        let params = self.homing_params(axis);
        HomingController::new(params)?.move_past(
            &mut self.session,
            axis,
            target,
            clicks,
            &NEVER_CANCELLED,
        )
    }

    /// Release the instruments.
    pub fn into_parts(self) -> (A, S, D) {
        self.session.into_parts()
    }
}

impl<A, S, D> SmartStage<A, S, D>
where
    A: Actuator + DriveSettings,
    S: PositionSensor,
    D: DelayNs,
{
    /// Apply a drive setting to an axis.
    pub fn apply_drive(&mut self, axis: Axis, drive: DriveConfig) -> Result<(), HomingError> {
        let actuator = self.session.actuator_mut();
        actuator.set_voltage(axis, drive.voltage)?;
        actuator.set_frequency(axis, drive.frequency)?;
        Ok(())
    }

    /// Home with the axis's closed-loop drive, then restore its open-loop
    /// drive if one is configured.
    ///
    /// A homing error takes precedence over a failure to restore the drive.
    pub fn move_to_with_drive(
        &mut self,
        axis: Axis,
        target: Millimetres,
    ) -> Result<HomingOutcome, HomingError> {
        let params = self.homing_params(axis);
        // Range errors must not touch the drive either.
        HomingController::new(params)?.check_target(target)?;

        let axis_config = self.config.axis(axis).copied().unwrap_or_default();
        self.apply_drive(axis, axis_config.closed_loop_drive())?;

        let result = self.home(axis, target, params, &NEVER_CANCELLED);

        let restored = match axis_config.open_loop {
            Some(drive) => self.apply_drive(axis, drive),
            None => Ok(()),
        };

        match (result, restored) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(_)) => {
                warn!("axis {}: open-loop drive not restored", axis);
                Err(e)
            }
        }
    }
}
