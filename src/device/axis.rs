//! Axis identifiers and travel direction.

use core::fmt;

use serde::Deserialize;

use crate::config::units::Millimetres;

/// Stage axis used to route step and readout requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Every axis, in routing order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lower-case axis name.
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Parse a lower- or upper-case axis name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of stage travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Increasing readout position.
    Forward,
    /// Decreasing readout position.
    Backward,
}

impl Direction {
    /// Direction that closes a signed gap (`target - current`).
    ///
    /// A zero gap maps to `Forward`; callers check tolerance first.
    #[inline]
    pub fn toward(gap: Millimetres) -> Self {
        if gap.0 >= 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Distance travelled along this direction between two readings.
    ///
    /// Positive when `to` lies further along this direction than `from`.
    #[inline]
    pub fn progress(self, from: Millimetres, to: Millimetres) -> Millimetres {
        Millimetres((to.0 - from.0) * self.sign())
    }
}
