//! Device capabilities consumed by the homing controller.
//!
//! An inertial piezo stage is driven through two independent instruments: a
//! step controller that fires open-loop pulses and a resistive readout that
//! reports absolute position. Each is modelled as a capability trait so real
//! drivers and test doubles plug in the same way.

mod axis;

pub use axis::{Axis, Direction};

use core::cell::RefCell;

use crate::config::units::{Hertz, Millimetres, Volts};
use crate::error::CommError;

/// Open-loop step actuator.
///
/// Displacement per step depends on drive voltage and frequency and is not
/// reproducible; callers must re-measure after every call.
pub trait Actuator {
    /// Fire `count` step pulses on `axis` in `direction` and wait for the
    /// controller to finish issuing them.
    fn step(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), CommError>;
}

/// Absolute position readout.
pub trait PositionSensor {
    /// Take one reading of `axis`. Each call is an independent noisy sample.
    fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError>;
}

/// Adjustable piezo drive for actuators that support it.
pub trait DriveSettings {
    /// Set the step amplitude on `axis`.
    fn set_voltage(&mut self, axis: Axis, voltage: Volts) -> Result<(), CommError>;

    /// Set the step repetition rate on `axis`.
    fn set_frequency(&mut self, axis: Axis, frequency: Hertz) -> Result<(), CommError>;
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn step(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), CommError> {
        (**self).step(axis, direction, count)
    }
}

impl<T: PositionSensor + ?Sized> PositionSensor for &mut T {
    fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError> {
        (**self).read(axis)
    }
}

impl<T: DriveSettings + ?Sized> DriveSettings for &mut T {
    fn set_voltage(&mut self, axis: Axis, voltage: Volts) -> Result<(), CommError> {
        (**self).set_voltage(axis, voltage)
    }

    fn set_frequency(&mut self, axis: Axis, frequency: Hertz) -> Result<(), CommError> {
        (**self).set_frequency(axis, frequency)
    }
}

// One instrument serving both roles in a single session.
impl<T: Actuator> Actuator for &RefCell<T> {
    fn step(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), CommError> {
        self.borrow_mut().step(axis, direction, count)
    }
}

impl<T: PositionSensor> PositionSensor for &RefCell<T> {
    fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError> {
        self.borrow_mut().read(axis)
    }
}

impl<T: DriveSettings> DriveSettings for &RefCell<T> {
    fn set_voltage(&mut self, axis: Axis, voltage: Volts) -> Result<(), CommError> {
        self.borrow_mut().set_voltage(axis, voltage)
    }

    fn set_frequency(&mut self, axis: Axis, frequency: Hertz) -> Result<(), CommError> {
        self.borrow_mut().set_frequency(axis, frequency)
    }
}
