//! Exclusive ownership of one stage's instruments.

use embedded_hal::delay::DelayNs;

use crate::config::units::Millimetres;
use crate::device::{Actuator, Axis, Direction, PositionSensor};
use crate::error::CommError;

/// The instruments of one stage, owned for the lifetime of a session.
///
/// Every operation takes `&mut self`, so at most one homing request can be in
/// flight per session. Stages on independent transports get independent
/// sessions and may be driven from separate threads.
///
/// Generic over:
/// - `A`: step actuator (must implement [`Actuator`])
/// - `S`: position readout (must implement [`PositionSensor`])
/// - `D`: delay provider for settling (must implement `DelayNs`)
pub struct StageSession<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    actuator: A,
    sensor: S,
    delay: D,
}

impl<A, S, D> StageSession<A, S, D>
where
    A: Actuator,
    S: PositionSensor,
    D: DelayNs,
{
    /// Take ownership of a stage's instruments.
    pub fn new(actuator: A, sensor: S, delay: D) -> Self {
        Self {
            actuator,
            sensor,
            delay,
        }
    }

    /// Read the current position of an axis.
    ///
    /// A NaN or infinite reading is reported as `MalformedReply`.
    pub fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError> {
        let position = self.sensor.read(axis)?;
        if !position.is_finite() {
            return Err(CommError::MalformedReply(
                heapless::String::try_from("non-finite position").unwrap_or_default(),
            ));
        }
        Ok(position)
    }

    /// Fire `count` steps on an axis.
    #[inline]
    pub fn step(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), CommError> {
        self.actuator.step(axis, direction, count)
    }

    /// Wait for mechanical transients to die out.
    #[inline]
    pub fn settle(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }

    /// Mutable access to the actuator.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Release the instruments.
    pub fn into_parts(self) -> (A, S, D) {
        (self.actuator, self.sensor, self.delay)
    }
}
