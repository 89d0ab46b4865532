//! Legal position range configuration.

use serde::Deserialize;

use super::units::Millimetres;

/// Inclusive interval of targets a homing request may ask for.
///
/// The readout itself enforces no bounds; targets outside this interval are
/// rejected before any actuation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LegalRange {
    /// Lowest legal target.
    #[serde(rename = "min_mm")]
    pub min: Millimetres,

    /// Highest legal target.
    #[serde(rename = "max_mm")]
    pub max: Millimetres,
}

impl Default for LegalRange {
    fn default() -> Self {
        Self {
            min: Millimetres(0.0),
            max: Millimetres(5.0),
        }
    }
}

impl LegalRange {
    /// Create a new range.
    pub fn new(min: Millimetres, max: Millimetres) -> Self {
        Self { min, max }
    }

    /// Check if the range is usable (finite, min < max).
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.0 < self.max.0
    }

    /// Check if a position is within the range (bounds inclusive).
    pub fn contains(&self, position: Millimetres) -> bool {
        position.0 >= self.min.0 && position.0 <= self.max.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = LegalRange::default();
        assert_eq!(range.min.0, 0.0);
        assert_eq!(range.max.0, 5.0);
        assert!(range.is_valid());
    }

    #[test]
    fn test_contains_inclusive() {
        let range = LegalRange::new(Millimetres(0.0), Millimetres(5.0));

        assert!(range.contains(Millimetres(0.0)));
        assert!(range.contains(Millimetres(5.0)));
        assert!(range.contains(Millimetres(3.3)));
        assert!(!range.contains(Millimetres(-0.0001)));
        assert!(!range.contains(Millimetres(10.0)));
        assert!(!range.contains(Millimetres(f64::NAN)));
    }

    #[test]
    fn test_inverted_range_invalid() {
        assert!(!LegalRange::new(Millimetres(5.0), Millimetres(0.0)).is_valid());
        assert!(!LegalRange::new(Millimetres(1.0), Millimetres(1.0)).is_valid());
        assert!(!LegalRange::new(Millimetres(0.0), Millimetres(f64::INFINITY)).is_valid());
    }
}
