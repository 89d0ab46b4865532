//! Unit tests for TOML configuration parsing.

use smart_stage::config::{load_config, parse_config, SystemConfig};
use smart_stage::{Axis, Hertz, Millimetres, Volts};

const CRYOSTAT: &str = r#"
name = "cryostat"

[homing]
initial_step_size = 100
tolerance_mm = 0.001
settling_delay_ms = 10
max_iterations_per_attempt = 500
flip_confirmation_gap_mm = 0.0
stall_window = 8

[homing.range]
min_mm = 0.0
max_mm = 5.0

[axes.x]
initial_step_size = 40
closed_loop = { voltage = 60.0, frequency = 200.0 }
open_loop = { voltage = 40.0, frequency = 100.0 }

[axes.y.range]
min_mm = 0.5
max_mm = 4.5
"#;

/// Test parsing the full schema.
#[test]
fn test_parse_full_config() {
    let config = parse_config(CRYOSTAT).expect("Failed to parse TOML");

    assert_eq!(config.name.as_str(), "cryostat");
    assert_eq!(config.homing.initial_step_size, 100);
    assert_eq!(config.homing.tolerance, Millimetres(0.001));
    assert_eq!(config.homing.settling_delay_ms, 10);
    assert_eq!(config.homing.max_iterations_per_attempt, 500);
    assert_eq!(config.homing.stall_window, Some(8));
    assert_eq!(config.homing.range.max, Millimetres(5.0));
}

/// Test per-axis drive settings.
#[test]
fn test_parse_axis_drive() {
    let config = parse_config(CRYOSTAT).expect("Failed to parse TOML");
    let x = config.axis(Axis::X).expect("X axis not found");

    let closed = x.closed_loop.expect("closed_loop missing");
    assert_eq!(closed.voltage, Volts(60.0));
    assert_eq!(closed.frequency, Hertz(200.0));

    let open = x.open_loop.expect("open_loop missing");
    assert_eq!(open.voltage, Volts(40.0));
    assert_eq!(open.frequency, Hertz(100.0));

    assert!(config.axis(Axis::Z).is_none());
}

/// Test overrides merge into the homing defaults.
#[test]
fn test_axis_overrides_merge() {
    let config = parse_config(CRYOSTAT).expect("Failed to parse TOML");

    let x = config.homing_for(Axis::X);
    assert_eq!(x.initial_step_size, 40);
    assert_eq!(x.range.min, Millimetres(0.0));

    let y = config.homing_for(Axis::Y);
    assert_eq!(y.initial_step_size, 100);
    assert_eq!(y.range.min, Millimetres(0.5));
    assert_eq!(y.range.max, Millimetres(4.5));

    let axes: Vec<Axis> = config.axis_names().collect();
    assert_eq!(axes, vec![Axis::X, Axis::Y]);
}

/// Test that an empty document yields the defaults.
#[test]
fn test_parse_empty_config() {
    let config = parse_config("").expect("Failed to parse TOML");
    let defaults = SystemConfig::default();

    assert_eq!(config.homing, defaults.homing);
    assert_eq!(config.homing.initial_step_size, 100);
    assert_eq!(config.homing.flip_confirmation_gap, Millimetres(0.0));
    assert!(config.homing.stall_window.is_none());
}

/// Test malformed TOML reports a parse error.
#[test]
fn test_parse_malformed() {
    let result = parse_config("[homing\ninitial_step_size = 1");
    assert!(matches!(
        result,
        Err(smart_stage::Error::Config(smart_stage::ConfigError::ParseError(_)))
    ));
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("smart_stage_config_parsing.toml");
    std::fs::write(&path, CRYOSTAT).expect("Failed to write config");

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.name.as_str(), "cryostat");

    let _ = std::fs::remove_file(&path);
}
