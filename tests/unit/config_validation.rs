//! Unit tests for configuration validation.

use smart_stage::config::{parse_config, validate_config, SystemConfig};
use smart_stage::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[homing]
initial_step_size = 40
tolerance_mm = 0.002

[axes.z]
closed_loop = { voltage = 70.0, frequency = 1000.0 }
"#;

    assert!(parse_config(toml_str).is_ok());
}

/// Test validation fails for a zero step size.
#[test]
fn test_zero_step_size() {
    let result = parse_config("[homing]\ninitial_step_size = 0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidStepSize(0)))
    ));
}

/// Test validation fails for a zero tolerance.
#[test]
fn test_zero_tolerance() {
    let result = parse_config("[homing]\ntolerance_mm = 0.0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidTolerance(_)))
    ));
}

/// Test validation fails for an inverted range.
#[test]
fn test_inverted_range() {
    let toml_str = r#"
[homing.range]
min_mm = 4.0
max_mm = 1.0
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidRange { .. }))
    ));
}

/// Test an axis override is validated after merging.
#[test]
fn test_axis_range_override_checked() {
    let toml_str = r#"
[axes.y.range]
min_mm = 2.0
max_mm = 2.0
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidRange { .. }))
    ));
}

/// Test drive voltage bounds.
#[test]
fn test_voltage_out_of_bounds() {
    let toml_str = r#"
[axes.x]
open_loop = { voltage = 80.0, frequency = 100.0 }
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidVoltage(v))) if v == 80.0
    ));
}

/// Test drive frequency bounds.
#[test]
fn test_frequency_out_of_bounds() {
    let toml_str = r#"
[axes.x]
closed_loop = { voltage = 40.0, frequency = 0.5 }
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidFrequency(_)))
    ));
}

/// Test a zero stall window is rejected.
#[test]
fn test_zero_stall_window() {
    let result = parse_config("[homing]\nstall_window = 0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidStallWindow(0)))
    ));
}

/// Test a negative confirmation gap is rejected.
#[test]
fn test_negative_confirmation_gap() {
    let result = parse_config("[homing]\nflip_confirmation_gap_mm = -0.01\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidConfirmationGap(_)))
    ));
}

/// Test that programmatic configurations go through the same checks.
#[test]
fn test_validate_config_directly() {
    let mut config = SystemConfig::default();
    config.homing.max_iterations_per_attempt = 0;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidIterationLimit(0)))
    ));
}
