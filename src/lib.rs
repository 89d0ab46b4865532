//! # smart-stage
//!
//! Closed-loop homing for piezo inertial stages with embedded-hal 1.0 support.
//!
//! An inertial piezo actuator moves in open-loop steps whose size drifts with
//! load, drive and direction. A separate absolute readout reports position
//! with noise. This crate closes the loop: it steps toward a target, re-reads
//! after every move, and refines the step size by decades whenever it
//! overshoots, until the reading lands within tolerance.
//!
//! ## Features
//!
//! - **Multi-resolution homing**: coarse-to-fine schedule from any initial step size
//! - **Bounded**: per-attempt iteration limit and optional stall detection
//! - **Configuration-driven**: homing defaults and per-axis overrides in TOML
//! - **embedded-hal 1.0**: `DelayNs` for settling between step and read
//! - **no_std compatible**: core library works without standard library
//! - **Simulated stage**: deterministic model for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use smart_stage::{Axis, Millimetres, SmartStage};
//!
//! let config = smart_stage::load_config("stage.toml")?;
//!
//! let mut stage = SmartStage::builder()
//!     .from_config(&config)
//!     .actuator(anc300)
//!     .sensor(readout)
//!     .delay(delay)
//!     .build()?;
//!
//! let outcome = stage.move_to(Axis::X, Millimetres(3.3))?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `log` output
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod device;
pub mod error;
pub mod homing;
pub mod sim;
pub mod stage;

// Re-exports for ergonomic API
pub use config::{validate_config, AxisConfig, DriveConfig, HomingConfig, LegalRange, SystemConfig};
pub use device::{Actuator, Axis, Direction, DriveSettings, PositionSensor};
pub use error::{CommError, ConfigError, Error, HomingError, RequestFault, Result};
pub use homing::{AttemptOutcome, CancelFlag, HomingController, HomingOutcome, MovePast, StepSchedule};
pub use sim::SimulatedStage;
pub use stage::{SmartStage, SmartStageBuilder, StageSession};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Hertz, Millimetres, Volts};
