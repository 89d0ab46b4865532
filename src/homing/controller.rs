//! Multi-resolution homing controller.

use embedded_hal::delay::DelayNs;

use crate::config::units::Millimetres;
use crate::config::HomingConfig;
use crate::device::{Actuator, Axis, Direction, PositionSensor};
use crate::error::{HomingError, RequestFault};
use crate::stage::StageSession;

use super::attempt::{Attempt, AttemptOutcome};
use super::cancel::CancelFlag;
use super::schedule::StepSchedule;

/// Result of a homing request that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomingOutcome {
    /// Landed within tolerance.
    Arrived {
        /// Final reading.
        position: Millimetres,
        /// Resolution that landed.
        step_size: u32,
    },
    /// Every resolution overshot. The caller may retry with another
    /// initial step size.
    Failed {
        /// Final reading.
        position: Millimetres,
    },
}

impl HomingOutcome {
    /// Check if the target was reached.
    pub fn is_arrived(&self) -> bool {
        matches!(self, HomingOutcome::Arrived { .. })
    }

    /// Final reading.
    pub fn position(&self) -> Millimetres {
        match *self {
            HomingOutcome::Arrived { position, .. } | HomingOutcome::Failed { position } => {
                position
            }
        }
    }
}

/// Result of an open-loop [`HomingController::move_past`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePast {
    /// Step calls issued.
    pub moves: u32,
    /// Reading that reached or passed the target.
    pub position: Millimetres,
}

/// Closed-loop controller for one set of homing parameters.
///
/// Holds no device state; every operation borrows a [`StageSession`]
/// exclusively for its duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingController {
    params: HomingConfig,
}

impl HomingController {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if the parameters cannot drive a homing request.
    pub fn new(params: HomingConfig) -> Result<Self, HomingError> {
        let fault = if params.initial_step_size == 0 {
            Some(RequestFault::ZeroStepSize)
        } else if !params.tolerance.is_finite() || params.tolerance.0 <= 0.0 {
            Some(RequestFault::NonPositiveTolerance)
        } else if !params.range.is_valid() {
            Some(RequestFault::InvertedRange)
        } else if params.max_iterations_per_attempt == 0 {
            Some(RequestFault::ZeroIterationLimit)
        } else {
            None
        };

        match fault {
            Some(fault) => Err(HomingError::InvalidRequest(fault)),
            None => Ok(Self { params }),
        }
    }

    /// Parameters in use.
    #[inline]
    pub fn params(&self) -> &HomingConfig {
        &self.params
    }

    /// Resolutions `move_to` will try, coarsest first.
    pub fn schedule(&self) -> Result<StepSchedule, HomingError> {
        StepSchedule::new(self.params.initial_step_size)
            .ok_or(HomingError::InvalidRequest(RequestFault::ZeroStepSize))
    }

    /// Reject targets that must not be attempted.
    pub fn check_target(&self, target: Millimetres) -> Result<(), HomingError> {
        if !target.is_finite() {
            return Err(HomingError::InvalidRequest(RequestFault::NonFiniteTarget));
        }
        let range = self.params.range;
        if !range.contains(target) {
            return Err(HomingError::OutOfRange {
                target,
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }

    /// Drive `axis` to `target`, trying each resolution of the schedule in
    /// turn until one lands within tolerance.
    ///
    /// An overshoot or stall at one resolution falls through to the next,
    /// finer one. If the schedule runs out, the request ends as
    /// [`HomingOutcome::Failed`], or as [`HomingError::Stalled`] when any
    /// resolution stalled.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` / `InvalidRequest` before any device traffic
    /// - `Stalled` as described above
    /// - `Cancelled` when `cancel` is observed after a read
    /// - `Comm` on the first transport failure
    pub fn move_to<A, S, D>(
        &self,
        session: &mut StageSession<A, S, D>,
        axis: Axis,
        target: Millimetres,
        cancel: &CancelFlag,
    ) -> Result<HomingOutcome, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        self.check_target(target)?;
        let schedule = self.schedule()?;

        debug!(
            "axis {}: homing to {} mm, {} resolution levels from {} steps",
            axis,
            target.0,
            schedule.len(),
            schedule.coarsest()
        );

        let mut stalled: Option<(u32, u32)> = None;
        let mut last_position = None;

        for step_size in schedule.iter() {
            let outcome = Attempt::new(axis, target, step_size, &self.params).run(session, cancel)?;
            last_position = Some(outcome.position());

            match outcome {
                AttemptOutcome::Arrived { position } => {
                    info!(
                        "axis {}: arrived at {} mm with {}-step moves",
                        axis, position.0, step_size
                    );
                    return Ok(HomingOutcome::Arrived {
                        position,
                        step_size,
                    });
                }
                AttemptOutcome::Overshot { position } => {
                    debug!(
                        "axis {}: overshot to {} mm with {}-step moves",
                        axis, position.0, step_size
                    );
                }
                AttemptOutcome::Stalled {
                    position,
                    iterations,
                } => {
                    warn!(
                        "axis {}: stalled at {} mm after {} {}-step moves",
                        axis, position.0, iterations, step_size
                    );
                    stalled = Some((step_size, iterations));
                }
            }
        }

        if let Some((step_size, iterations)) = stalled {
            return Err(HomingError::Stalled {
                axis,
                step_size,
                iterations,
            });
        }

        let position = last_position.unwrap_or(target);
        warn!(
            "axis {}: no resolution reached {} mm, stopped at {} mm",
            axis, target.0, position.0
        );
        Ok(HomingOutcome::Failed { position })
    }

    /// Run one fixed-resolution attempt.
    ///
    /// # Errors
    ///
    /// As [`move_to`](Self::move_to), except that a stall is reported as
    /// [`AttemptOutcome::Stalled`].
    pub fn attempt_at<A, S, D>(
        &self,
        session: &mut StageSession<A, S, D>,
        axis: Axis,
        target: Millimetres,
        step_size: u32,
        cancel: &CancelFlag,
    ) -> Result<AttemptOutcome, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        if step_size == 0 {
            return Err(HomingError::InvalidRequest(RequestFault::ZeroStepSize));
        }
        self.check_target(target)?;

        Attempt::new(axis, target, step_size, &self.params).run(session, cancel)
    }

    /// Step `clicks` at a time toward `target` until the reading reaches or
    /// passes it, without any attempt to land within tolerance.
    ///
    /// Always issues at least one step call. Useful to approach a target from
    /// a known side before a closed-loop move.
    ///
    /// # Errors
    ///
    /// `Stalled` when `max_iterations_per_attempt` step calls do not reach the
    /// target; otherwise as [`move_to`](Self::move_to).
    pub fn move_past<A, S, D>(
        &self,
        session: &mut StageSession<A, S, D>,
        axis: Axis,
        target: Millimetres,
        clicks: u32,
        cancel: &CancelFlag,
    ) -> Result<MovePast, HomingError>
    where
        A: Actuator,
        S: PositionSensor,
        D: DelayNs,
    {
        if clicks == 0 {
            return Err(HomingError::InvalidRequest(RequestFault::ZeroStepSize));
        }
        self.check_target(target)?;

        let start = session.read(axis)?;
        if cancel.is_cancelled() {
            return Err(HomingError::Cancelled { axis });
        }
        let direction = Direction::toward(target - start);

        let mut moves = 0;
        loop {
            if moves >= self.params.max_iterations_per_attempt {
                return Err(HomingError::Stalled {
                    axis,
                    step_size: clicks,
                    iterations: moves,
                });
            }

            session.step(axis, direction, clicks)?;
            moves += 1;
            session.settle(self.params.settling_delay_ms);

            let position = session.read(axis)?;
            if cancel.is_cancelled() {
                return Err(HomingError::Cancelled { axis });
            }
            if direction.progress(target, position).0 >= 0.0 {
                trace!("axis {}: passed {} mm after {} moves", axis, target.0, moves);
                return Ok(MovePast { moves, position });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use embedded_hal_mock::eh1::delay::NoopDelay;

    use super::*;
    use crate::config::LegalRange;
    use crate::error::CommError;
    use crate::sim::SimulatedStage;

    /// Readout that raises `cancel` once the shared stage has served
    /// `after` reads.
    struct CancellingReadout<'a> {
        sim: &'a RefCell<SimulatedStage>,
        cancel: &'a CancelFlag,
        after: u32,
    }

    impl PositionSensor for CancellingReadout<'_> {
        fn read(&mut self, axis: Axis) -> Result<Millimetres, CommError> {
            let position = self.sim.borrow_mut().read(axis)?;
            if self.sim.borrow().read_calls() >= self.after {
                self.cancel.cancel();
            }
            Ok(position)
        }
    }

    fn controller(initial: u32) -> HomingController {
        HomingController::new(
            HomingConfig::default()
                .with_initial_step_size(initial)
                .with_settling_delay_ms(0),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = HomingConfig::default().with_initial_step_size(0);
        assert_eq!(
            HomingController::new(params),
            Err(HomingError::InvalidRequest(RequestFault::ZeroStepSize))
        );

        let params = HomingConfig::default()
            .with_range(LegalRange::new(Millimetres(5.0), Millimetres(0.0)));
        assert_eq!(
            HomingController::new(params),
            Err(HomingError::InvalidRequest(RequestFault::InvertedRange))
        );
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let c = controller(10);
        assert_eq!(
            c.check_target(Millimetres(f64::NAN)),
            Err(HomingError::InvalidRequest(RequestFault::NonFiniteTarget))
        );
    }

    #[test]
    fn test_out_of_range_touches_nothing() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        let result = controller(40).move_to(&mut session, Axis::X, Millimetres(10.0), &CancelFlag::new());

        assert!(matches!(result, Err(HomingError::OutOfRange { .. })));
        assert_eq!(sim.borrow().read_calls(), 0);
        assert_eq!(sim.borrow().step_calls(), 0);
    }

    #[test]
    fn test_attempt_at_checks_step_size() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        let result = controller(40).attempt_at(&mut session, Axis::X, Millimetres(1.0), 0, &CancelFlag::new());

        assert_eq!(
            result,
            Err(HomingError::InvalidRequest(RequestFault::ZeroStepSize))
        );
    }

    #[test]
    fn test_move_past_counts_moves() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::Y, Millimetres(1.0)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        // 10 clicks = 0.1 mm per move: 1.1 ... 1.5 reaches 1.45.
        let result = controller(40)
            .move_past(&mut session, Axis::Y, Millimetres(1.45), 10, &CancelFlag::new())
            .unwrap();

        assert_eq!(result.moves, 5);
        assert!((result.position.0 - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_move_past_bounded_when_stuck() {
        let sim = RefCell::new(
            SimulatedStage::new(Millimetres(0.01))
                .at(Axis::Y, Millimetres(1.0))
                .stalling_after(0),
        );
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());
        let c = HomingController::new(
            HomingConfig::default()
                .with_settling_delay_ms(0)
                .with_max_iterations(12),
        )
        .unwrap();

        let result = c.move_past(&mut session, Axis::Y, Millimetres(0.5), 10, &CancelFlag::new());

        assert_eq!(
            result,
            Err(HomingError::Stalled {
                axis: Axis::Y,
                step_size: 10,
                iterations: 12
            })
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let arrived = HomingOutcome::Arrived {
            position: Millimetres(3.3),
            step_size: 1,
        };
        assert!(arrived.is_arrived());
        assert_eq!(arrived.position(), Millimetres(3.3));
        assert!(!HomingOutcome::Failed {
            position: Millimetres(3.2)
        }
        .is_arrived());
    }

    #[test]
    fn test_non_finite_reading_stops_homing() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).with_read_offsets(&[f64::NAN]));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        let result = controller(100).move_to(&mut session, Axis::X, Millimetres(3.3), &CancelFlag::new());

        assert!(matches!(
            result,
            Err(HomingError::Comm(CommError::MalformedReply(_)))
        ));
        assert_eq!(sim.borrow().step_calls(), 0);
    }

    #[test]
    fn test_move_past_rejects_non_finite_reading() {
        let sim = RefCell::new(
            SimulatedStage::new(Millimetres(0.01))
                .at(Axis::Y, Millimetres(1.0))
                .with_read_offsets(&[0.0, f64::INFINITY]),
        );
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        let result = controller(40).move_past(&mut session, Axis::Y, Millimetres(2.0), 10, &CancelFlag::new());

        assert!(matches!(
            result,
            Err(HomingError::Comm(CommError::MalformedReply(_)))
        ));
        assert_eq!(sim.borrow().step_calls(), 1);
    }

    #[test]
    fn test_cancel_observed_mid_run() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::X, Millimetres(1.0)));
        let cancel = CancelFlag::new();
        let readout = CancellingReadout {
            sim: &sim,
            cancel: &cancel,
            after: 5,
        };
        let mut session = StageSession::new(&sim, readout, NoopDelay::new());

        let result = controller(10).move_to(&mut session, Axis::X, Millimetres(3.0), &cancel);

        assert_eq!(result, Err(HomingError::Cancelled { axis: Axis::X }));
        assert_eq!(sim.borrow().step_calls(), 4);
    }

    #[test]
    fn test_move_past_cancel_mid_run() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::Y, Millimetres(1.0)));
        let cancel = CancelFlag::new();
        let readout = CancellingReadout {
            sim: &sim,
            cancel: &cancel,
            after: 3,
        };
        let mut session = StageSession::new(&sim, readout, NoopDelay::new());

        let result = controller(40).move_past(&mut session, Axis::Y, Millimetres(2.0), 10, &cancel);

        assert_eq!(result, Err(HomingError::Cancelled { axis: Axis::Y }));
        assert_eq!(sim.borrow().step_calls(), 2);
    }

    #[test]
    fn test_move_past_cancelled_before_stepping() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::Y, Millimetres(1.0)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = controller(40).move_past(&mut session, Axis::Y, Millimetres(2.0), 10, &cancel);

        assert_eq!(result, Err(HomingError::Cancelled { axis: Axis::Y }));
        assert_eq!(sim.borrow().step_calls(), 0);
    }

    #[test]
    fn test_first_coarse_move_overshoots() {
        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::X, Millimetres(1.0)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());

        // 100: one move to 2.0 passes 1.25. 10: 1.9 ... 1.2 passes it again.
        // 1: 1.21 ... 1.25 lands.
        let c = controller(100);
        let overshoot = c
            .attempt_at(&mut session, Axis::X, Millimetres(1.25), 100, &CancelFlag::new())
            .unwrap();
        assert!(matches!(overshoot, AttemptOutcome::Overshot { .. }));
        assert_eq!(sim.borrow().step_calls(), 1);

        let sim = RefCell::new(SimulatedStage::new(Millimetres(0.01)).at(Axis::X, Millimetres(1.0)));
        let mut session = StageSession::new(&sim, &sim, NoopDelay::new());
        let outcome = c
            .move_to(&mut session, Axis::X, Millimetres(1.25), &CancelFlag::new())
            .unwrap();

        match outcome {
            HomingOutcome::Arrived { position, step_size } => {
                assert_eq!(step_size, 1);
                assert!((position.0 - 1.25).abs() <= 0.001);
            }
            other => panic!("expected arrival, got {:?}", other),
        }
        assert_eq!(sim.borrow().step_calls(), 14);
    }
}
