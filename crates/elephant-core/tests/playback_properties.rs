//! Property-based tests for scenario playback
//!
//! These tests verify the replay invariants over generated scenarios:
//! - Exact offsets report their own value
//! - Every second inside a tiled range timeline matches exactly one range
//! - Playback is a pure function of (scenario, elapsed)

use elephant_core::{
    PlaybackError, RangeAdjacency, RawRange, RawTimepoint, ScenarioInput, ValidationLimits,
    validate, validate_ranges, validate_timepoints, value_at,
};
use proptest::prelude::*;

const LIMITS: ValidationLimits =
    ValidationLimits { max_points: 64, adjacency: RangeAdjacency::Inclusive };

/// Strictly increasing offsets built from positive gaps.
fn timepoints_strategy() -> impl Strategy<Value = Vec<RawTimepoint>> {
    prop::collection::vec((1i64..500, 0.0f64..=1000.0), 1..32).prop_map(|steps| {
        let mut offset = -1;
        steps
            .into_iter()
            .map(|(gap, value)| {
                offset += gap;
                RawTimepoint::new(offset, value)
            })
            .collect()
    })
}

/// Ranges tiled under `adjacency`, starting at `origin`.
fn ranges_strategy(adjacency: RangeAdjacency) -> impl Strategy<Value = Vec<RawRange>> {
    (0i64..1000, prop::collection::vec((1i64..500, 0.0f64..=1000.0), 1..32)).prop_map(
        move |(origin, steps)| {
            let mut start = origin;
            steps
                .into_iter()
                .map(|(width, value)| {
                    let range = RawRange::new(start, start + width, value);
                    start = adjacency.next_start(range.end);
                    range
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_exact_offset_reports_its_value(points in timepoints_strategy()) {
        let scenario = validate_timepoints(&points, &LIMITS).expect("generated timepoints are valid");

        for point in &points {
            prop_assert_eq!(value_at(&scenario, point.offset.cast_unsigned()), Ok(point.value));
        }
    }

    #[test]
    fn prop_timepoint_value_is_latest_not_after(points in timepoints_strategy(), probe in 0u64..20_000) {
        let scenario = validate_timepoints(&points, &LIMITS).expect("generated timepoints are valid");
        let last = points.last().map_or(0, |p| p.offset.cast_unsigned());

        match value_at(&scenario, probe) {
            Ok(value) => {
                prop_assert!(probe <= last);
                let expected = points
                    .iter()
                    .rev()
                    .find(|p| p.offset.cast_unsigned() <= probe)
                    .or(points.first())
                    .map(|p| p.value);
                prop_assert_eq!(Some(value), expected);
            },
            Err(PlaybackError::ElapsedOutOfRange { elapsed, end, .. }) => {
                prop_assert!(probe > last);
                prop_assert_eq!(elapsed, probe);
                prop_assert_eq!(end, last);
            },
        }
    }

    #[test]
    fn prop_inclusive_ranges_tile_exactly_once(ranges in ranges_strategy(RangeAdjacency::Inclusive)) {
        let scenario = validate_ranges(&ranges, &LIMITS).expect("generated ranges are valid");
        let (start, end) = scenario.span();

        for elapsed in start..=end {
            let matching: Vec<_> = ranges
                .iter()
                .filter(|r| r.start.cast_unsigned() <= elapsed && elapsed <= r.end.cast_unsigned())
                .collect();
            prop_assert_eq!(matching.len(), 1);
            prop_assert_eq!(value_at(&scenario, elapsed), Ok(matching[0].value));
        }

        prop_assert!(value_at(&scenario, end + 1).is_err());
        if start > 0 {
            prop_assert!(value_at(&scenario, start - 1).is_err());
        }
    }

    #[test]
    fn prop_shared_boundary_ranges_validate(ranges in ranges_strategy(RangeAdjacency::SharedBoundary)) {
        let limits = ValidationLimits { adjacency: RangeAdjacency::SharedBoundary, ..LIMITS };
        prop_assert!(validate_ranges(&ranges, &limits).is_ok());

        // The same tiling leaves overlaps under the inclusive rule
        if ranges.len() > 1 {
            prop_assert!(validate_ranges(&ranges, &LIMITS).is_err());
        }
    }

    #[test]
    fn prop_describe_round_trips(points in timepoints_strategy()) {
        let input = ScenarioInput::Timepoints(points);
        let scenario = validate(&input, &LIMITS).expect("generated timepoints are valid");

        prop_assert_eq!(scenario.to_input(), input);
    }

    #[test]
    fn prop_playback_is_deterministic(points in timepoints_strategy(), probe in 0u64..20_000) {
        let scenario = validate_timepoints(&points, &LIMITS).expect("generated timepoints are valid");
        prop_assert_eq!(value_at(&scenario, probe), value_at(&scenario, probe));
    }
}
