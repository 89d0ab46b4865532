//! Configuration module for smart-stage.
//!
//! Provides types for loading and validating homing parameters and per-axis
//! overrides from TOML files (with `std` feature) or pre-parsed data.

mod axis;
mod homing;
mod limits;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{AxisConfig, AxisTable, DriveConfig};
pub use homing::HomingConfig;
pub use limits::LegalRange;
pub use system::SystemConfig;
pub use validation::{validate_config, validate_homing};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Hertz, Millimetres, Volts};
