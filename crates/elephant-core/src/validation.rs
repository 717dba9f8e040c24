//! Scenario validation.
//!
//! Pure functions that check a proposed scenario before it is admitted to a
//! session store. Rules run in a fixed order and the first failure wins:
//!
//! 1. Size: `1..=max_points` entries
//! 2. Timepoint ordering: non-negative, strictly increasing offsets
//! 3. Range shape: non-negative starts, `start < end`, adjacency between
//!    consecutive ranges
//! 4. Value bounds: every value finite and within `[0, 1000]`
//!
//! Validation has no side effects and needs no synchronization.

use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    scenario::{
        MAX_INTENSITY, MIN_INTENSITY, Range, RawRange, RawTimepoint, Scenario, ScenarioData,
        ScenarioInput, Timepoint,
    },
};

/// How consecutive ranges must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeAdjacency {
    /// Range ends are inclusive whole seconds; the next range starts one second
    /// later (`[0, 3600]` then `[3601, 7200]`).
    #[default]
    Inclusive,

    /// The next range starts exactly where the previous one ends (`[0, 3600]`
    /// then `[3600, 7200]`). The shared second belongs to the later range.
    SharedBoundary,
}

impl RangeAdjacency {
    /// Start required for the range following one that ends at `previous_end`.
    pub fn next_start(self, previous_end: i64) -> i64 {
        match self {
            Self::Inclusive => previous_end.saturating_add(1),
            Self::SharedBoundary => previous_end,
        }
    }
}

/// Limits applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Maximum number of timepoints or ranges per scenario.
    pub max_points: usize,
    /// Adjacency rule for ranges.
    pub adjacency: RangeAdjacency,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self { max_points: 1000, adjacency: RangeAdjacency::default() }
    }
}

/// Validate a tagged scenario input.
pub fn validate(
    input: &ScenarioInput,
    limits: &ValidationLimits,
) -> Result<Scenario, ValidationError> {
    match input {
        ScenarioInput::Timepoints(points) => validate_timepoints(points, limits),
        ScenarioInput::Ranges(ranges) => validate_ranges(ranges, limits),
    }
}

/// Validate `[offset, value]` pairs.
pub fn validate_timepoints(
    points: &[RawTimepoint],
    limits: &ValidationLimits,
) -> Result<Scenario, ValidationError> {
    check_size(points.len(), limits.max_points)?;

    let mut previous: Option<i64> = None;
    for (index, point) in points.iter().enumerate() {
        if point.offset < 0 {
            return Err(ValidationError::InvalidOffset { index, offset: point.offset });
        }

        if let Some(previous) = previous {
            if point.offset == previous {
                return Err(ValidationError::DuplicateTimepoint { index, offset: point.offset });
            }
            if point.offset < previous {
                return Err(ValidationError::TimepointsOutOfOrder {
                    index,
                    offset: point.offset,
                    previous,
                });
            }
        }
        previous = Some(point.offset);
    }

    check_values(points.iter().map(|p| p.value))?;

    let validated = points
        .iter()
        .map(|p| Timepoint { offset: p.offset.cast_unsigned(), value: p.value })
        .collect();

    Ok(Scenario::from_validated(ScenarioData::Timepoints(validated)))
}

/// Validate `[start, end, value]` triples.
pub fn validate_ranges(
    ranges: &[RawRange],
    limits: &ValidationLimits,
) -> Result<Scenario, ValidationError> {
    check_size(ranges.len(), limits.max_points)?;

    let mut previous_end: Option<i64> = None;
    for (index, range) in ranges.iter().enumerate() {
        if range.start < 0 {
            return Err(ValidationError::InvalidOffset { index, offset: range.start });
        }

        if range.start >= range.end {
            return Err(ValidationError::EmptyRange { index, start: range.start, end: range.end });
        }

        if let Some(previous_end) = previous_end {
            let expected_start = limits.adjacency.next_start(previous_end);
            if range.start < expected_start {
                return Err(ValidationError::RangeOverlap {
                    index,
                    previous_end,
                    start: range.start,
                });
            }
            if range.start > expected_start {
                return Err(ValidationError::RangeGap {
                    index,
                    expected_start,
                    start: range.start,
                });
            }
        }
        previous_end = Some(range.end);
    }

    check_values(ranges.iter().map(|r| r.value))?;

    let validated = ranges
        .iter()
        .map(|r| Range {
            start: r.start.cast_unsigned(),
            end: r.end.cast_unsigned(),
            value: r.value,
        })
        .collect();

    Ok(Scenario::from_validated(ScenarioData::Ranges(validated)))
}

fn check_size(len: usize, max: usize) -> Result<(), ValidationError> {
    if len == 0 || len > max {
        return Err(ValidationError::SizeExceeded { len, max });
    }
    Ok(())
}

fn check_values(values: impl Iterator<Item = f64>) -> Result<(), ValidationError> {
    for (index, value) in values.enumerate() {
        // NaN fails the containment check as well
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&value) {
            return Err(ValidationError::ValueOutOfBounds { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(i64, f64)]) -> Vec<RawTimepoint> {
        raw.iter().copied().map(RawTimepoint::from).collect()
    }

    fn ranges(raw: &[(i64, i64, f64)]) -> Vec<RawRange> {
        raw.iter().copied().map(RawRange::from).collect()
    }

    fn limits(adjacency: RangeAdjacency) -> ValidationLimits {
        ValidationLimits { max_points: 10, adjacency }
    }

    #[test]
    fn accepts_increasing_timepoints() {
        let scenario = validate_timepoints(
            &points(&[(1, 150.0), (30, 200.0), (60, 300.0), (120, 100.0)]),
            &ValidationLimits::default(),
        )
        .expect("valid");

        assert_eq!(scenario.len(), 4);
        assert_eq!(scenario.span(), (1, 120));
    }

    #[test]
    fn rejects_empty_scenario() {
        let result = validate_timepoints(&[], &ValidationLimits::default());
        assert_eq!(result, Err(ValidationError::SizeExceeded { len: 0, max: 1000 }));
    }

    #[test]
    fn rejects_too_many_points() {
        let raw: Vec<_> = (0..11).map(|i| RawTimepoint::new(i, 1.0)).collect();
        let result = validate_timepoints(&raw, &limits(RangeAdjacency::Inclusive));
        assert_eq!(result, Err(ValidationError::SizeExceeded { len: 11, max: 10 }));
    }

    #[test]
    fn rejects_duplicate_offsets() {
        let result =
            validate_timepoints(&points(&[(10, 100.0), (10, 200.0)]), &ValidationLimits::default());
        assert_eq!(result, Err(ValidationError::DuplicateTimepoint { index: 1, offset: 10 }));
    }

    #[test]
    fn rejects_decreasing_offsets() {
        let result =
            validate_timepoints(&points(&[(10, 100.0), (5, 200.0)]), &ValidationLimits::default());
        assert!(matches!(result, Err(ValidationError::TimepointsOutOfOrder { index: 1, .. })));
    }

    #[test]
    fn rejects_negative_offset() {
        let result =
            validate_timepoints(&points(&[(-1, 100.0), (5, 200.0)]), &ValidationLimits::default());
        assert_eq!(result, Err(ValidationError::InvalidOffset { index: 0, offset: -1 }));
    }

    #[test]
    fn rejects_value_above_bound() {
        let result =
            validate_timepoints(&points(&[(0, 100.0), (5, 1500.0)]), &ValidationLimits::default());
        assert_eq!(result, Err(ValidationError::ValueOutOfBounds { index: 1, value: 1500.0 }));
    }

    #[test]
    fn accepts_bound_values() {
        let result =
            validate_timepoints(&points(&[(0, 0.0), (5, 1000.0)]), &ValidationLimits::default());
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_nan_value() {
        let result = validate_timepoints(&points(&[(0, f64::NAN)]), &ValidationLimits::default());
        assert!(matches!(result, Err(ValidationError::ValueOutOfBounds { index: 0, .. })));
    }

    #[test]
    fn ordering_rule_wins_over_value_rule() {
        let result =
            validate_timepoints(&points(&[(10, 5000.0), (10, 200.0)]), &ValidationLimits::default());
        assert!(matches!(result, Err(ValidationError::DuplicateTimepoint { .. })));
    }

    #[test]
    fn inclusive_adjacency_accepts_one_second_step() {
        let raw = ranges(&[(0, 3600, 150.0), (3601, 7200, 200.0)]);
        let scenario = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive)).expect("valid");
        assert_eq!(scenario.span(), (0, 7200));
    }

    #[test]
    fn inclusive_adjacency_rejects_shared_boundary_as_overlap() {
        let raw = ranges(&[(0, 3600, 150.0), (3600, 7200, 200.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert_eq!(
            result,
            Err(ValidationError::RangeOverlap { index: 1, previous_end: 3600, start: 3600 })
        );
    }

    #[test]
    fn shared_boundary_rejects_one_second_step_as_gap() {
        let raw = ranges(&[(0, 3600, 150.0), (3601, 7200, 200.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::SharedBoundary));
        assert_eq!(
            result,
            Err(ValidationError::RangeGap { index: 1, expected_start: 3600, start: 3601 })
        );
    }

    #[test]
    fn shared_boundary_accepts_touching_ranges() {
        let raw = ranges(&[(0, 3600, 150.0), (3600, 7200, 200.0)]);
        assert!(validate_ranges(&raw, &limits(RangeAdjacency::SharedBoundary)).is_ok());
    }

    #[test]
    fn rejects_wide_gap() {
        let raw = ranges(&[(0, 10, 1.0), (20, 30, 2.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert!(matches!(result, Err(ValidationError::RangeGap { index: 1, .. })));
    }

    #[test]
    fn rejects_backwards_range_order() {
        let raw = ranges(&[(100, 200, 1.0), (0, 50, 2.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert!(matches!(result, Err(ValidationError::RangeOverlap { index: 1, .. })));
    }

    #[test]
    fn rejects_empty_range() {
        let raw = ranges(&[(10, 10, 1.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert_eq!(result, Err(ValidationError::EmptyRange { index: 0, start: 10, end: 10 }));
    }

    #[test]
    fn rejects_negative_range_start() {
        let raw = ranges(&[(-10, 10, 1.0)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert_eq!(result, Err(ValidationError::InvalidOffset { index: 0, offset: -10 }));
    }

    #[test]
    fn rejects_range_value_out_of_bounds() {
        let raw = ranges(&[(0, 10, 1.0), (11, 20, -0.5)]);
        let result = validate_ranges(&raw, &limits(RangeAdjacency::Inclusive));
        assert_eq!(result, Err(ValidationError::ValueOutOfBounds { index: 1, value: -0.5 }));
    }

    #[test]
    fn dispatches_on_input_kind() {
        let input = ScenarioInput::Ranges(ranges(&[(0, 10, 1.0)]));
        let scenario = validate(&input, &ValidationLimits::default()).expect("valid");
        assert_eq!(scenario.kind(), input.kind());
        assert_eq!(scenario.to_input(), input);
    }
}
