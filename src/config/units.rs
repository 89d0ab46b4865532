//! Unit types for physical quantities.
//!
//! Provides type-safe representations of stage positions and piezo drive
//! parameters to prevent unit confusion at compile time.

use core::ops::{Add, Neg, Sub};

use serde::Deserialize;

/// Linear stage position or distance in millimetres.
///
/// Readout positions, targets, tolerances and range bounds all use this unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Millimetres(pub f64);

impl Millimetres {
    /// Create a new Millimetres value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Absolute magnitude.
    #[inline]
    pub fn abs(self) -> Self {
        Self(libm::fabs(self.0))
    }

    /// True unless NaN or infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Convert to micrometres.
    #[inline]
    pub fn to_micrometres(self) -> f64 {
        self.0 * 1000.0
    }

    /// Create from micrometres.
    #[inline]
    pub fn from_micrometres(um: f64) -> Self {
        Self(um / 1000.0)
    }
}

impl Add for Millimetres {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Millimetres {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Millimetres {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Piezo drive amplitude in volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f64);

impl Volts {
    /// Lowest amplitude the stage controller accepts.
    pub const MIN: Volts = Volts(0.01);
    /// Highest amplitude the stage controller accepts.
    pub const MAX: Volts = Volts(70.0);

    /// Create a new Volts value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Check the amplitude lies within [`Volts::MIN`, `Volts::MAX`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >= Self::MIN.0 && self.0 <= Self::MAX.0
    }
}

/// Piezo step repetition rate in hertz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Hertz(pub f64);

impl Hertz {
    /// Lowest step rate the stage controller accepts.
    pub const MIN: Hertz = Hertz(1.0);
    /// Highest step rate the stage controller accepts.
    pub const MAX: Hertz = Hertz(1000.0);

    /// Create a new Hertz value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Check the rate lies within [`Hertz::MIN`, `Hertz::MAX`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >= Self::MIN.0 && self.0 <= Self::MAX.0
    }
}
