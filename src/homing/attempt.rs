//! Single-resolution homing attempt.
//!
//! One attempt steps toward the target at a fixed step size, re-reading the
//! position after every actuation, until it lands within tolerance, passes
//! the target, or runs out of budget. The loop is an explicit state machine
//! so every cycle goes through the same bound and cancellation checks.

use embedded_hal::delay::DelayNs;

use crate::config::units::Millimetres;
use crate::config::HomingConfig;
use crate::device::{Actuator, Axis, Direction, PositionSensor};
use crate::error::HomingError;
use crate::stage::StageSession;

use super::cancel::CancelFlag;

/// How a single-resolution attempt ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttemptOutcome {
    /// Reading within tolerance of the target.
    Arrived {
        /// Last reading.
        position: Millimetres,
    },
    /// Reading passed the target relative to the attempt-start direction.
    Overshot {
        /// Last reading.
        position: Millimetres,
    },
    /// Iteration budget or stall window exhausted.
    Stalled {
        /// Last reading.
        position: Millimetres,
        /// Actuations issued.
        iterations: u32,
    },
}

impl AttemptOutcome {
    /// Last reading taken by the attempt.
    pub fn position(&self) -> Millimetres {
        match *self {
            AttemptOutcome::Arrived { position }
            | AttemptOutcome::Overshot { position }
            | AttemptOutcome::Stalled { position, .. } => position,
        }
    }

    /// Check if the attempt arrived.
    pub fn is_arrived(&self) -> bool {
        matches!(self, AttemptOutcome::Arrived { .. })
    }
}

/// Phase of an attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttemptPhase {
    /// About to read the position.
    Measuring,
    /// Classifying a fresh reading.
    Deciding {
        /// The reading.
        position: Millimetres,
    },
    /// Re-reading after a crossing too small to trust.
    Confirming,
    /// About to actuate.
    Stepping,
    /// Finished.
    Done(AttemptOutcome),
}

/// Runtime state of one attempt.
#[derive(Debug, Clone)]
pub struct Attempt<'p> {
    axis: Axis,
    target: Millimetres,
    step_size: u32,
    params: &'p HomingConfig,

    phase: AttemptPhase,

    /// Fixed from the first reading.
    direction: Option<Direction>,

    /// Reading taken before the latest actuation.
    before_step: Option<Millimetres>,

    /// Set while the current reading is a confirmation read.
    confirming: bool,

    iterations: u32,

    /// Consecutive actuations that advanced less than tolerance.
    idle_steps: u32,
}

impl<'p> Attempt<'p> {
    /// Create an attempt. Parameters are assumed validated.
    pub fn new(axis: Axis, target: Millimetres, step_size: u32, params: &'p HomingConfig) -> Self {
        Self {
            axis,
            target,
            step_size,
            params,
            phase: AttemptPhase::Measuring,
            direction: None,
            before_step: None,
            confirming: false,
            iterations: 0,
            idle_steps: 0,
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Direction fixed at the first reading, if taken.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Actuations issued so far.
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the flag is observed after a read; `Comm` on any
    /// transport failure, which aborts immediately.
    pub fn run<A, S, D>(
        &mut self,
        session: &mut StageSession<A, S, D>,
        cancel: &CancelFlag,
    ) -> Result<AttemptOutcome, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        loop {
            self.phase = match self.phase {
                AttemptPhase::Measuring => {
                    let position = self.measure(session, cancel)?;
                    AttemptPhase::Deciding { position }
                }
                AttemptPhase::Confirming => {
                    let position = self.measure(session, cancel)?;
                    self.confirming = true;
                    AttemptPhase::Deciding { position }
                }
                AttemptPhase::Deciding { position } => {
                    let next = self.decide(position);
                    self.confirming = false;
                    next
                }
                AttemptPhase::Stepping => self.actuate(session)?,
                AttemptPhase::Done(outcome) => return Ok(outcome),
            };
        }
    }

    fn measure<A, S, D>(
        &mut self,
        session: &mut StageSession<A, S, D>,
        cancel: &CancelFlag,
    ) -> Result<Millimetres, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        let position = session.read(self.axis)?;
        if cancel.is_cancelled() {
            return Err(HomingError::Cancelled { axis: self.axis });
        }
        Ok(position)
    }

    fn actuate<A, S, D>(
        &mut self,
        session: &mut StageSession<A, S, D>,
    ) -> Result<AttemptPhase, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        let Some(direction) = self.direction else {
            return Ok(AttemptPhase::Measuring);
        };

        if self.iterations >= self.params.max_iterations_per_attempt {
            return Ok(self.stalled());
        }

        session.step(self.axis, direction, self.step_size)?;
        self.iterations += 1;
        session.settle(self.params.settling_delay_ms);

        Ok(AttemptPhase::Measuring)
    }

    fn decide(&mut self, position: Millimetres) -> AttemptPhase {
        let gap = self.target - position;
        let tolerance = self.params.tolerance;

        if gap.abs().0 <= tolerance.0 {
            return AttemptPhase::Done(AttemptOutcome::Arrived { position });
        }

        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                let direction = Direction::toward(gap);
                self.direction = Some(direction);
                self.before_step = Some(position);
                return AttemptPhase::Stepping;
            }
        };

        // How far past the target, along the attempt-start direction.
        let crossing = direction.progress(self.target, position);
        if crossing.0 > 0.0 {
            if !self.confirming && crossing.0 < self.params.flip_confirmation_gap.0 {
                return AttemptPhase::Confirming;
            }
            return AttemptPhase::Done(AttemptOutcome::Overshot { position });
        }

        if let (Some(window), Some(before)) = (self.params.stall_window, self.before_step) {
            if direction.progress(before, position).0 < tolerance.0 {
                self.idle_steps += 1;
            } else {
                self.idle_steps = 0;
            }
            if self.idle_steps >= window {
                self.before_step = Some(position);
                return self.stalled();
            }
        }

        self.before_step = Some(position);
        AttemptPhase::Stepping
    }

    fn stalled(&self) -> AttemptPhase {
        let position = self.before_step.unwrap_or(self.target);
        AttemptPhase::Done(AttemptOutcome::Stalled {
            position,
            iterations: self.iterations,
        })
    }
}
