//! Simulated piezo stage.
//!
//! One object plays both instruments: it moves a true position per axis on
//! every step call and reports it on every read. Faults, stalls, backlash and
//! readout noise can be injected to exercise the homing controller without
//! hardware. Share it between both roles through `&RefCell<SimulatedStage>`.

use crate::config::units::{Hertz, Millimetres, Volts};
use crate::config::DriveConfig;
use crate::device::{Actuator, Axis, Direction, DriveSettings, PositionSensor};
use crate::error::CommError;

/// Travel per step at 1 V and 1 Hz, scaled as voltage / frequency.
const DRIVE_SCALE: f64 = 1.0 / 500.0;

/// Resting position of every axis before `at` is called.
const START_POSITION: Millimetres = Millimetres(2.5);

const MAX_READ_OFFSETS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
enum StepModel {
    Fixed(Millimetres),
    Drive,
}

/// Deterministic stage model.
#[derive(Debug, Clone)]
pub struct SimulatedStage {
    model: StepModel,
    positions: [Millimetres; 3],
    drives: [DriveConfig; 3],
    last_direction: [Option<Direction>; 3],
    backlash: Millimetres,
    moving_calls: Option<u32>,
    read_offsets: heapless::Vec<f64, MAX_READ_OFFSETS>,
    failing_read: Option<u32>,
    failing_step: Option<u32>,
    failing_drive: Option<u32>,
    step_calls: u32,
    read_calls: u32,
    drive_writes: u32,
    pulses: u64,
}

fn slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

fn transport(msg: &str) -> CommError {
    CommError::Transport(heapless::String::try_from(msg).unwrap_or_default())
}

impl SimulatedStage {
    /// Stage that moves `per_step` on every pulse regardless of drive.
    pub fn new(per_step: Millimetres) -> Self {
        Self::with_model(StepModel::Fixed(per_step), DriveConfig::CLOSED_LOOP_DEFAULT)
    }

    /// Stage whose travel per pulse follows the drive setting of each axis.
    ///
    /// 40 V at 100 Hz moves 0.0008 mm per pulse.
    pub fn from_drive(drive: DriveConfig) -> Self {
        Self::with_model(StepModel::Drive, drive)
    }

    fn with_model(model: StepModel, drive: DriveConfig) -> Self {
        Self {
            model,
            positions: [START_POSITION; 3],
            drives: [drive; 3],
            last_direction: [None; 3],
            backlash: Millimetres(0.0),
            moving_calls: None,
            read_offsets: heapless::Vec::new(),
            failing_read: None,
            failing_step: None,
            failing_drive: None,
            step_calls: 0,
            read_calls: 0,
            drive_writes: 0,
            pulses: 0,
        }
    }

    /// Place an axis at a true position.
    pub fn at(mut self, axis: Axis, position: Millimetres) -> Self {
        self.positions[slot(axis)] = position;
        self
    }

    /// Lose `backlash` of travel on the first step call after each
    /// direction reversal.
    pub fn with_backlash(mut self, backlash: Millimetres) -> Self {
        self.backlash = backlash;
        self
    }

    /// Only the first `calls` step calls move the stage.
    pub fn stalling_after(mut self, calls: u32) -> Self {
        self.moving_calls = Some(calls);
        self
    }

    /// Add offsets to successive readings, cycling through the list.
    ///
    /// At most 32 offsets are kept.
    pub fn with_read_offsets(mut self, offsets: &[f64]) -> Self {
        self.read_offsets.clear();
        for &offset in offsets.iter().take(MAX_READ_OFFSETS) {
            let _ = self.read_offsets.push(offset);
        }
        self
    }

    /// The `nth` read (1-based) times out.
    pub fn failing_read(mut self, nth: u32) -> Self {
        self.failing_read = Some(nth);
        self
    }

    /// The `nth` step call (1-based) reports a transport error.
    pub fn failing_step(mut self, nth: u32) -> Self {
        self.failing_step = Some(nth);
        self
    }

    /// The `nth` drive write (1-based) reports a transport error.
    pub fn failing_drive_write(mut self, nth: u32) -> Self {
        self.failing_drive = Some(nth);
        self
    }

    /// Step calls received, including failed ones.
    pub fn step_calls(&self) -> u32 {
        self.step_calls
    }

    /// Reads received, including failed ones.
    pub fn read_calls(&self) -> u32 {
        self.read_calls
    }

    /// Voltage and frequency writes received.
    pub fn drive_writes(&self) -> u32 {
        self.drive_writes
    }

    /// Pulses fired across all axes.
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Noise-free position of an axis.
    pub fn true_position(&self, axis: Axis) -> Millimetres {
        self.positions[slot(axis)]
    }

    /// Current drive setting of an axis.
    pub fn drive(&self, axis: Axis) -> DriveConfig {
        self.drives[slot(axis)]
    }

    /// Travel per pulse on an axis under its current drive.
    pub fn per_step_distance(&self, axis: Axis) -> Millimetres {
        match self.model {
            StepModel::Fixed(distance) => distance,
            StepModel::Drive => {
                let drive = self.drives[slot(axis)];
                Millimetres(drive.voltage.0 / drive.frequency.0 * DRIVE_SCALE)
            }
        }
    }

    fn record_drive_write(&mut self) -> Result<(), CommError> {
        self.drive_writes += 1;
        if self.failing_drive == Some(self.drive_writes) {
            return Err(transport("drive setting rejected"));
        }
        Ok(())
    }
}

impl Actuator for SimulatedStage {
    fn step(&mut self, axis: Axis, direction: Direction, count: u32) -> Result<(), CommError> {
        self.step_calls += 1;
        if self.failing_step == Some(self.step_calls) {
            return Err(transport("step controller offline"));
        }
        self.pulses += u64::from(count);

        if matches!(self.moving_calls, Some(limit) if self.step_calls > limit) {
            return Ok(());
        }

        let i = slot(axis);
        let mut travel = self.per_step_distance(axis).0 * f64::from(count);
        if self.last_direction[i] == Some(direction.reversed()) {
            travel = libm::fmax(travel - self.backlash.0, 0.0);
        }
        self.last_direction[i] = Some(direction);

        self.positions[i] = Millimetres(self.positions[i].0 + direction.sign() * travel);
        Ok(())
    }
}

impl PositionSensor for SimulatedStage {
    fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError> {
        self.read_calls += 1;
        if self.failing_read == Some(self.read_calls) {
            return Err(CommError::Timeout);
        }

        let offset = if self.read_offsets.is_empty() {
            0.0
        } else {
            let idx = (self.read_calls - 1) as usize % self.read_offsets.len();
            self.read_offsets[idx]
        };
        Ok(Millimetres(self.positions[slot(axis)].0 + offset))
    }
}

impl DriveSettings for SimulatedStage {
    fn set_voltage(&mut self, axis: Axis, voltage: Volts) -> Result<(), CommError> {
        self.record_drive_write()?;
        self.drives[slot(axis)].voltage = voltage;
        Ok(())
    }

    fn set_frequency(&mut self, axis: Axis, frequency: Hertz) -> Result<(), CommError> {
        self.record_drive_write()?;
        self.drives[slot(axis)].frequency = frequency;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_derived_travel() {
        let sim = SimulatedStage::from_drive(DriveConfig::new(Volts(40.0), Hertz(100.0)));
        assert!((sim.per_step_distance(Axis::Z).0 - 0.0008).abs() < 1e-12);
    }

    #[test]
    fn test_step_moves_true_position() {
        let mut sim = SimulatedStage::new(Millimetres(0.01));
        sim.step(Axis::X, Direction::Backward, 50).unwrap();

        assert!((sim.true_position(Axis::X).0 - 2.0).abs() < 1e-9);
        assert_eq!(sim.true_position(Axis::Y), START_POSITION);
        assert_eq!(sim.pulses(), 50);
    }

    #[test]
    fn test_backlash_on_reversal() {
        let mut sim = SimulatedStage::new(Millimetres(0.01)).with_backlash(Millimetres(0.05));
        sim.step(Axis::X, Direction::Forward, 10).unwrap();
        sim.step(Axis::X, Direction::Backward, 10).unwrap();
        sim.step(Axis::X, Direction::Backward, 10).unwrap();

        // 2.5 + 0.1 - 0.05 - 0.1
        assert!((sim.true_position(Axis::X).0 - 2.45).abs() < 1e-9);
    }

    #[test]
    fn test_injected_faults() {
        let mut sim = SimulatedStage::new(Millimetres(0.01))
            .failing_read(2)
            .failing_step(1);

        assert!(matches!(sim.step(Axis::X, Direction::Forward, 1), Err(CommError::Transport(_))));
        assert!(sim.read(Axis::X).is_ok());
        assert_eq!(sim.read(Axis::X), Err(CommError::Timeout));
        assert!(sim.read(Axis::X).is_ok());
    }

    #[test]
    fn test_drive_write_updates_model() {
        let mut sim = SimulatedStage::from_drive(DriveConfig::CLOSED_LOOP_DEFAULT);
        sim.set_voltage(Axis::Y, Volts(40.0)).unwrap();
        sim.set_frequency(Axis::Y, Hertz(100.0)).unwrap();

        assert_eq!(sim.drive(Axis::Y), DriveConfig::new(Volts(40.0), Hertz(100.0)));
        assert_eq!(sim.drive_writes(), 2);
    }
}
