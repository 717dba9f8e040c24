//! Operations for model-based testing.
//!
//! Operations represent every externally visible action on the session store.
//! They are generated randomly by proptest and applied to both the model and
//! the real implementation.

use arbitrary::Arbitrary;
use elephant_core::RawTimepoint;

/// Index into the sessions created so far, wrapped modulo their count.
pub type SlotId = u8;

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum Operation {
    /// Create a timepoint session.
    Create {
        /// Scenario to submit.
        shape: ScenarioShape,
    },

    /// Create a session walked point by point.
    CreateStepped {
        /// Scenario to submit.
        shape: ScenarioShape,
        /// Reads per point before the cursor moves on (taken modulo 4, zero holds).
        budget: u8,
    },

    /// Read the current value of a session.
    Read {
        /// Target session.
        slot: SlotId,
        /// Elapsed seconds.
        elapsed: u16,
    },

    /// Read the value at a session's playback cursor.
    Step {
        /// Target session.
        slot: SlotId,
    },

    /// Move a session's playback cursor one point on.
    Advance {
        /// Target session.
        slot: SlotId,
    },

    /// Delete a session.
    Remove {
        /// Target session.
        slot: SlotId,
    },

    /// Advance the clock.
    AdvanceTime {
        /// Minutes to advance.
        minutes: u8,
    },

    /// Run one expiry sweep.
    Purge,
}

/// Compact description of a timepoint scenario.
///
/// Expands to `len()` points spaced [`ScenarioShape::STEP`] seconds apart,
/// starting at offset zero. Lengths outside the configured limits exercise
/// the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct ScenarioShape {
    /// Point count hint (taken modulo 12).
    pub points: u8,
    /// Base intensity value.
    pub seed: u8,
}

impl ScenarioShape {
    /// Seconds between consecutive timepoints.
    pub const STEP: u64 = 60;

    /// Largest point count a shape can produce.
    pub const MAX_LEN: usize = 11;

    /// Number of timepoints.
    pub fn len(&self) -> usize {
        usize::from(self.points) % (Self::MAX_LEN + 1)
    }

    /// Whether the scenario has no timepoints.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intensity of the `index`-th timepoint. Always within bounds.
    pub fn value(&self, index: usize) -> f64 {
        f64::from(self.seed) + f64::from(u32::try_from(index).unwrap_or(u32::MAX)) * 10.0
    }

    /// Offset of the `index`-th timepoint in seconds.
    pub fn offset(index: usize) -> u64 {
        u64::try_from(index).unwrap_or(u64::MAX).saturating_mul(Self::STEP)
    }

    /// Expand to raw timepoints.
    pub fn timepoints(&self) -> Vec<RawTimepoint> {
        (0..self.len())
            .map(|index| {
                let offset = i64::try_from(Self::offset(index)).unwrap_or(i64::MAX);
                RawTimepoint::new(offset, self.value(index))
            })
            .collect()
    }
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// Session created.
    Created,

    /// Value served by a read.
    Value(f64),

    /// Point index and value served by stepped playback.
    Step(usize, f64),

    /// Whether a removal found the session.
    Removed(bool),

    /// Sessions reclaimed by a sweep.
    Purged(usize),

    /// Clock advanced.
    Advanced,

    /// Operation failed with an expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Scenario rejected by validation.
    InvalidScenario,

    /// Live session limit reached.
    CapacityExceeded,

    /// Session unknown, removed or expired.
    NotFound,

    /// Elapsed time outside the scenario.
    OutOfRange,
}

/// Per-point read budget encoded by a `CreateStepped` budget byte.
pub fn step_budget(budget: u8) -> Option<u32> {
    match budget % 4 {
        0 => None,
        n => Some(u32::from(n)),
    }
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_expands_to_spaced_points() {
        let shape = ScenarioShape { points: 15, seed: 100 };
        let points = shape.timepoints();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0], RawTimepoint::new(0, 100.0));
        assert_eq!(points[1], RawTimepoint::new(60, 110.0));
        assert_eq!(points[2], RawTimepoint::new(120, 120.0));
    }

    #[test]
    fn budget_byte_wraps() {
        assert_eq!(step_budget(0), None);
        assert_eq!(step_budget(2), Some(2));
        assert_eq!(step_budget(7), Some(3));
        assert_eq!(step_budget(8), None);
    }

    #[test]
    fn values_stay_in_bounds() {
        let shape = ScenarioShape { points: 11, seed: u8::MAX };
        assert!(shape.timepoints().iter().all(|p| p.value <= elephant_core::MAX_INTENSITY));
    }
}
