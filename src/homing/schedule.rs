//! Step-size schedules for multi-resolution homing.

use heapless::Vec;

/// Longest possible schedule: ten decades of `u32` plus a leading
/// non-power-of-ten entry.
pub const MAX_SCHEDULE_LEN: usize = 11;

/// Ordered step sizes tried coarsest first.
///
/// Strictly decreasing and always ending at 1. One entry per decade from the
/// largest power of ten not exceeding the initial step size; a non-power-of-ten
/// initial size is kept as an extra leading entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSchedule {
    steps: Vec<u32, MAX_SCHEDULE_LEN>,
}

impl StepSchedule {
    /// Build the schedule for an initial step size.
    ///
    /// Returns `None` for zero.
    pub fn new(initial: u32) -> Option<Self> {
        if initial == 0 {
            return None;
        }

        let mut steps = Vec::new();
        let mut decade = largest_power_of_ten(initial);

        if decade != initial {
            steps.push(initial).ok()?;
        }
        loop {
            steps.push(decade).ok()?;
            if decade == 1 {
                break;
            }
            decade /= 10;
        }

        Some(Self { steps })
    }

    /// Coarsest step size.
    #[inline]
    pub fn coarsest(&self) -> u32 {
        self.steps[0]
    }

    /// Number of resolution levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true; a schedule always contains at least the 1-step level.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step sizes as a slice, coarsest first.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.steps
    }

    /// Iterate over step sizes, coarsest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.iter().copied()
    }
}

impl<'a> IntoIterator for &'a StepSchedule {
    type Item = &'a u32;
    type IntoIter = core::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// True when `n` is 1, 10, 100, ...
pub fn is_power_of_ten(n: u32) -> bool {
    n != 0 && largest_power_of_ten(n) == n
}

fn largest_power_of_ten(n: u32) -> u32 {
    let mut p = 1u32;
    while let Some(next) = p.checked_mul(10) {
        if next > n {
            break;
        }
        p = next;
    }
    p
}
