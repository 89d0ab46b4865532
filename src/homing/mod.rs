//! Homing module for smart-stage.
//!
//! Closes the loop around an open-loop step actuator using absolute position
//! readback, converging coarse-to-fine over a schedule of step sizes.

mod attempt;
mod cancel;
mod controller;
mod schedule;

pub use attempt::{Attempt, AttemptOutcome, AttemptPhase};
pub use cancel::CancelFlag;
pub use controller::{HomingController, HomingOutcome, MovePast};
pub use schedule::{is_power_of_ten, StepSchedule, MAX_SCHEDULE_LEN};
