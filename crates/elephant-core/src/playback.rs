//! Scenario playback.
//!
//! Computes the value a scenario reports at a given elapsed time. Both shapes
//! are searched with `partition_point` over their monotonic keys, so lookups
//! are O(log n).
//!
//! # Semantics
//!
//! - Timepoints: the latest offset `<= elapsed` wins. Before the first offset
//!   the first value is reported; past the last offset is an error.
//! - Ranges: the range containing `elapsed` wins. Anything outside the tiled
//!   timeline is an error. Under shared-boundary adjacency the boundary second
//!   belongs to the later range.

use crate::{
    error::PlaybackError,
    scenario::{Range, Scenario, ScenarioData, Timepoint},
};

/// Value reported by `scenario` after `elapsed` seconds of playback.
pub fn value_at(scenario: &Scenario, elapsed: u64) -> Result<f64, PlaybackError> {
    let value = match scenario.data() {
        ScenarioData::Timepoints(points) => timepoint_value(points, elapsed),
        ScenarioData::Ranges(ranges) => range_value(ranges, elapsed),
    };

    value.ok_or_else(|| {
        let (start, end) = scenario.span();
        PlaybackError::ElapsedOutOfRange { elapsed, start, end }
    })
}

fn timepoint_value(points: &[Timepoint], elapsed: u64) -> Option<f64> {
    let last = points.last()?;
    if elapsed > last.offset {
        return None;
    }

    let idx = points.partition_point(|p| p.offset <= elapsed);
    match idx.checked_sub(1) {
        Some(i) => points.get(i).map(|p| p.value),
        // Before the first offset: hold the first value
        None => points.first().map(|p| p.value),
    }
}

fn range_value(ranges: &[Range], elapsed: u64) -> Option<f64> {
    let idx = ranges.partition_point(|r| r.start <= elapsed).checked_sub(1)?;
    let range = ranges.get(idx)?;
    (elapsed <= range.end).then_some(range.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scenario::{RawRange, RawTimepoint},
        validation::{RangeAdjacency, ValidationLimits, validate_ranges, validate_timepoints},
    };

    fn timepoints(raw: &[(i64, f64)]) -> Scenario {
        let raw: Vec<_> = raw.iter().copied().map(RawTimepoint::from).collect();
        validate_timepoints(&raw, &ValidationLimits::default()).expect("valid timepoints")
    }

    fn ranges(raw: &[(i64, i64, f64)], adjacency: RangeAdjacency) -> Scenario {
        let raw: Vec<_> = raw.iter().copied().map(RawRange::from).collect();
        validate_ranges(&raw, &ValidationLimits { max_points: 100, adjacency })
            .expect("valid ranges")
    }

    #[test]
    fn timepoint_holds_latest_value() {
        let scenario = timepoints(&[(1, 150.0), (30, 200.0), (60, 300.0), (120, 100.0)]);

        assert_eq!(value_at(&scenario, 45), Ok(200.0));
        assert_eq!(value_at(&scenario, 30), Ok(200.0));
        assert_eq!(value_at(&scenario, 59), Ok(200.0));
        assert_eq!(value_at(&scenario, 60), Ok(300.0));
        assert_eq!(value_at(&scenario, 120), Ok(100.0));
    }

    #[test]
    fn timepoint_before_first_offset_returns_first_value() {
        let scenario = timepoints(&[(1, 150.0), (30, 200.0), (60, 300.0), (120, 100.0)]);
        assert_eq!(value_at(&scenario, 0), Ok(150.0));
    }

    #[test]
    fn timepoint_past_last_offset_is_out_of_range() {
        let scenario = timepoints(&[(1, 150.0), (30, 200.0), (60, 300.0), (120, 100.0)]);
        assert_eq!(
            value_at(&scenario, 121),
            Err(PlaybackError::ElapsedOutOfRange { elapsed: 121, start: 1, end: 120 })
        );
    }

    #[test]
    fn single_timepoint() {
        let scenario = timepoints(&[(0, 42.0)]);
        assert_eq!(value_at(&scenario, 0), Ok(42.0));
        assert!(value_at(&scenario, 1).is_err());
    }

    #[test]
    fn inclusive_ranges_cover_both_ends() {
        let scenario =
            ranges(&[(0, 3600, 150.0), (3601, 7200, 200.0)], RangeAdjacency::Inclusive);

        assert_eq!(value_at(&scenario, 0), Ok(150.0));
        assert_eq!(value_at(&scenario, 3600), Ok(150.0));
        assert_eq!(value_at(&scenario, 3601), Ok(200.0));
        assert_eq!(value_at(&scenario, 7200), Ok(200.0));
    }

    #[test]
    fn shared_boundary_belongs_to_later_range() {
        let scenario =
            ranges(&[(0, 3600, 150.0), (3600, 7200, 200.0)], RangeAdjacency::SharedBoundary);

        assert_eq!(value_at(&scenario, 3599), Ok(150.0));
        assert_eq!(value_at(&scenario, 3600), Ok(200.0));
        assert_eq!(value_at(&scenario, 7200), Ok(200.0));
    }

    #[test]
    fn ranges_outside_timeline_are_out_of_range() {
        let scenario = ranges(&[(10, 20, 1.0), (21, 30, 2.0)], RangeAdjacency::Inclusive);

        assert_eq!(
            value_at(&scenario, 9),
            Err(PlaybackError::ElapsedOutOfRange { elapsed: 9, start: 10, end: 30 })
        );
        assert_eq!(
            value_at(&scenario, 31),
            Err(PlaybackError::ElapsedOutOfRange { elapsed: 31, start: 10, end: 30 })
        );
    }
}
