//! Builder pattern for SmartStage.

use embedded_hal::delay::DelayNs;

use crate::config::{validate_config, AxisConfig, HomingConfig, SystemConfig};
use crate::device::{Actuator, Axis, PositionSensor};
use crate::error::{ConfigError, Error, Result};

use super::session::StageSession;
use super::smart::SmartStage;

/// Builder for creating SmartStage instances.
pub struct SmartStageBuilder<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    actuator: Option<A>,
    sensor: Option<S>,
    delay: Option<D>,
    config: SystemConfig,
}

impl<A, S, D> Default for SmartStageBuilder<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, S, D> SmartStageBuilder<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            actuator: None,
            sensor: None,
            delay: None,
            config: SystemConfig::default(),
        }
    }

    /// Set the step actuator.
    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Set the position readout.
    pub fn sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the stage name. Names longer than 32 bytes are ignored.
    pub fn name(mut self, name: &str) -> Self {
        if let Ok(name) = heapless::String::try_from(name) {
            self.config.name = name;
        }
        self
    }

    /// Set the homing defaults shared by every axis.
    pub fn homing(mut self, homing: HomingConfig) -> Self {
        self.config.homing = homing;
        self
    }

    /// Set overrides for one axis.
    pub fn axis(mut self, axis: Axis, config: AxisConfig) -> Self {
        self.config.axes.set(axis, config);
        self
    }

    /// Take name, homing defaults and axis overrides from a loaded
    /// configuration.
    pub fn from_config(mut self, config: &SystemConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Build the SmartStage.
    ///
    /// # Errors
    ///
    /// Returns an error if an instrument is missing or the configuration is
    /// invalid.
    pub fn build(self) -> Result<SmartStage<A, S, D>> {
        let actuator = self
            .actuator
            .ok_or(Error::Config(ConfigError::MissingComponent("actuator")))?;
        let sensor = self
            .sensor
            .ok_or(Error::Config(ConfigError::MissingComponent("sensor")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingComponent("delay")))?;

        validate_config(&self.config)?;

        Ok(SmartStage::new(
            StageSession::new(actuator, sensor, delay),
            self.config,
        ))
    }
}
