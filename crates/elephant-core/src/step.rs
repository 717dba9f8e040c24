//! Stepped playback.
//!
//! Besides elapsed-time replay, a session can be walked point by point. A
//! cursor starts on the first timepoint or range and only moves forward:
//!
//! - `advance` moves it one point on and reports the new point.
//! - `read` reports the current point. Once a point has been read as often as
//!   its call threshold allows, the cursor moves on by itself.
//!
//! The cursor never moves past the last point; reads and advances there keep
//! reporting the last value.

use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, scenario::Scenario};

/// Per-point read budgets for stepped playback.
///
/// `Some(n)` moves the cursor on after `n` reads of that point; `Some(0)`
/// behaves like `Some(1)`. `None`, or a point past the end of the list, holds
/// until an explicit advance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallThresholds(Vec<Option<u32>>);

impl CallThresholds {
    /// Wrap per-point budgets, first point first.
    pub fn new(thresholds: Vec<Option<u32>>) -> Self {
        Self(thresholds)
    }

    /// Reads allowed on the point at `index` before the cursor moves on.
    pub fn budget(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied().flatten().map(|n| n.max(1))
    }

    /// Number of budgets supplied.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no budgets were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject budgets that name points the scenario does not have.
    pub fn check(&self, scenario: &Scenario) -> Result<(), ValidationError> {
        if self.len() > scenario.len() {
            return Err(ValidationError::TooManyThresholds {
                thresholds: self.len(),
                points: scenario.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<Option<u32>>> for CallThresholds {
    fn from(thresholds: Vec<Option<u32>>) -> Self {
        Self(thresholds)
    }
}

/// A point served by stepped playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Step {
    /// Index of the timepoint or range served.
    pub index: usize,
    /// Its value.
    pub value: f64,
}

/// Position of a session in stepped playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCursor {
    index: usize,
    /// Reads of the current point so far.
    reads: u32,
}

impl StepCursor {
    /// Cursor on the first point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the current point.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Serve the current point, then move on if its budget is used up.
    pub fn read(&mut self, scenario: &Scenario, thresholds: &CallThresholds) -> Step {
        let served = Step { index: self.index, value: scenario.point_value(self.index) };

        if let Some(budget) = thresholds.budget(self.index) {
            self.reads = self.reads.saturating_add(1);
            if self.reads >= budget {
                self.move_next(scenario.len());
            }
        }

        served
    }

    /// Move to the next point and serve it. Stays on the last point.
    pub fn advance(&mut self, scenario: &Scenario) -> Step {
        self.move_next(scenario.len());
        Step { index: self.index, value: scenario.point_value(self.index) }
    }

    fn move_next(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
            self.reads = 0;
        }
    }
}
