//! Stage module for smart-stage.
//!
//! Ties a step actuator, a position readout and a delay provider to one
//! validated configuration.

mod builder;
mod session;
mod smart;

pub use builder::SmartStageBuilder;
pub use session::StageSession;
pub use smart::SmartStage;
