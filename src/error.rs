//! Error types for smart-stage.
//!
//! Provides unified error handling across configuration, device communication
//! and closed-loop homing.

use core::fmt;

use crate::config::units::Millimetres;
use crate::device::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all smart-stage operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Homing or device operation error
    Homing(HomingError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Initial step size must be at least 1
    InvalidStepSize(u32),
    /// Tolerance must be finite and > 0
    InvalidTolerance(f64),
    /// Legal range must be finite with min < max
    InvalidRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Iteration bound must be at least 1
    InvalidIterationLimit(u32),
    /// Flip confirmation gap must be finite and >= 0
    InvalidConfirmationGap(f64),
    /// Stall window must be at least 1 when set
    InvalidStallWindow(u32),
    /// Drive voltage outside [0.01, 70] V
    InvalidVoltage(f64),
    /// Drive frequency outside [1, 1000] Hz
    InvalidFrequency(f64),
    /// A required builder component was not supplied
    MissingComponent(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Transport-level failure reported by an actuator or position sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum CommError {
    /// No reply before the communication timeout
    Timeout,
    /// The transport reported an error
    Transport(heapless::String<64>),
    /// A reply arrived but could not be interpreted
    MalformedReply(heapless::String<64>),
}

/// Homing request rejected before any device traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFault {
    /// Initial step size of zero
    ZeroStepSize,
    /// Tolerance not finite or not strictly positive
    NonPositiveTolerance,
    /// Legal range not finite or min >= max
    InvertedRange,
    /// Target is NaN or infinite
    NonFiniteTarget,
    /// Iteration bound of zero
    ZeroIterationLimit,
}

/// Closed-loop homing errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HomingError {
    /// Target lies outside the legal range; nothing was moved
    OutOfRange {
        /// Requested target
        target: Millimetres,
        /// Lower bound of the legal range
        min: Millimetres,
        /// Upper bound of the legal range
        max: Millimetres,
    },
    /// The axis stopped making progress within its iteration budget
    Stalled {
        /// Axis that stalled
        axis: Axis,
        /// Step size of the last stalled attempt
        step_size: u32,
        /// Actuations issued by that attempt
        iterations: u32,
    },
    /// Caller requested abort
    Cancelled {
        /// Axis being moved when the flag was observed
        axis: Axis,
    },
    /// Actuator or sensor transport failure
    Comm(CommError),
    /// Request parameters are unusable
    InvalidRequest(RequestFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Homing(e) => write!(f, "Homing error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepSize(v) => {
                write!(f, "Invalid initial step size: {}. Must be >= 1", v)
            }
            ConfigError::InvalidTolerance(v) => write!(f, "Invalid tolerance: {}. Must be > 0", v),
            ConfigError::InvalidRange { min, max } => {
                write!(f, "Invalid legal range: min ({}) must be < max ({})", min, max)
            }
            ConfigError::InvalidIterationLimit(v) => {
                write!(f, "Invalid max iterations per attempt: {}. Must be >= 1", v)
            }
            ConfigError::InvalidConfirmationGap(v) => {
                write!(f, "Invalid flip confirmation gap: {}. Must be >= 0", v)
            }
            ConfigError::InvalidStallWindow(v) => {
                write!(f, "Invalid stall window: {}. Must be >= 1", v)
            }
            ConfigError::InvalidVoltage(v) => write!(f, "Invalid voltage: {} V. Must be 0.01-70", v),
            ConfigError::InvalidFrequency(v) => {
                write!(f, "Invalid frequency: {} Hz. Must be 1-1000", v)
            }
            ConfigError::MissingComponent(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::Timeout => write!(f, "Device did not reply before timeout"),
            CommError::Transport(msg) => write!(f, "Transport error: {}", msg),
            CommError::MalformedReply(msg) => write!(f, "Malformed reply: {}", msg),
        }
    }
}

impl fmt::Display for RequestFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFault::ZeroStepSize => write!(f, "initial step size is zero"),
            RequestFault::NonPositiveTolerance => write!(f, "tolerance must be > 0"),
            RequestFault::InvertedRange => write!(f, "legal range min must be < max"),
            RequestFault::NonFiniteTarget => write!(f, "target is not finite"),
            RequestFault::ZeroIterationLimit => write!(f, "iteration limit is zero"),
        }
    }
}

impl fmt::Display for HomingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomingError::OutOfRange { target, min, max } => {
                write!(
                    f,
                    "Target {} mm outside legal range [{}, {}] mm",
                    target.0, min.0, max.0
                )
            }
            HomingError::Stalled {
                axis,
                step_size,
                iterations,
            } => write!(
                f,
                "Axis {} stalled at step size {} after {} actuations",
                axis, step_size, iterations
            ),
            HomingError::Cancelled { axis } => write!(f, "Homing on axis {} cancelled", axis),
            HomingError::Comm(e) => write!(f, "Communication failure: {}", e),
            HomingError::InvalidRequest(fault) => write!(f, "Invalid request: {}", fault),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<HomingError> for Error {
    fn from(e: HomingError) -> Self {
        Error::Homing(e)
    }
}

impl From<CommError> for HomingError {
    fn from(e: CommError) -> Self {
        HomingError::Comm(e)
    }
}

impl From<CommError> for Error {
    fn from(e: CommError) -> Self {
        Error::Homing(HomingError::Comm(e))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for CommError {}

#[cfg(feature = "std")]
impl std::error::Error for HomingError {}
