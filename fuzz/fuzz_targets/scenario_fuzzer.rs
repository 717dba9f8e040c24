//! Fuzz target for scenario validation and playback
//!
//! Malformed client scenarios must be rejected, never admitted or panicked on
//!
//! # Strategy
//!
//! - Raw inputs: Arbitrary offsets, ranges and values, including negative
//!   offsets, NaN, infinities and `i64` extremes
//! - Near-valid inputs: Ranges built by walking the adjacency rule with
//!   fuzzed lengths, so the happy path is reached often
//! - Probing: Every admitted scenario is replayed at fuzzed elapsed times
//!
//! # Invariants
//!
//! - Admitted scenarios have `1..=max_points` entries
//! - Admitted values are finite and within bounds
//! - Timepoint offsets strictly increase; ranges tile with no gap or overlap
//! - Playback succeeds exactly inside the scenario span
//! - Describing an admitted scenario and validating it again is lossless
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use elephant_core::{
    MAX_INTENSITY, MIN_INTENSITY, RangeAdjacency, RawRange, RawTimepoint, Scenario, ScenarioData,
    ScenarioInput, ValidationLimits, validate, value_at,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzScenario {
    Timepoints(Vec<(i64, f64)>),
    Ranges(Vec<(i64, i64, f64)>),
    /// Start offset plus `(length, value)` pairs laid out by the adjacency rule
    WalkedRanges { start: u16, steps: Vec<(u16, u8)> },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    scenario: FuzzScenario,
    max_points: u8,
    shared_boundary: bool,
    probes: Vec<u64>,
}

fn build(scenario: FuzzScenario, adjacency: RangeAdjacency) -> ScenarioInput {
    match scenario {
        FuzzScenario::Timepoints(points) => {
            ScenarioInput::Timepoints(points.into_iter().map(RawTimepoint::from).collect())
        },
        FuzzScenario::Ranges(ranges) => {
            ScenarioInput::Ranges(ranges.into_iter().map(RawRange::from).collect())
        },
        FuzzScenario::WalkedRanges { start, steps } => {
            let mut next = i64::from(start);
            let ranges = steps
                .into_iter()
                .map(|(len, value)| {
                    let end = next + i64::from(len);
                    let range = RawRange::new(next, end, f64::from(value) * 4.0);
                    next = adjacency.next_start(end);
                    range
                })
                .collect();
            ScenarioInput::Ranges(ranges)
        },
    }
}

fn check_admitted(scenario: &Scenario, limits: &ValidationLimits) {
    assert!(!scenario.is_empty());
    assert!(scenario.len() <= limits.max_points);

    match scenario.data() {
        ScenarioData::Timepoints(points) => {
            assert!(points.windows(2).all(|w| w[0].offset < w[1].offset));
            for p in points {
                assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&p.value));
            }
        },
        ScenarioData::Ranges(ranges) => {
            for r in ranges {
                assert!(r.start < r.end);
                assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&r.value));
            }
            for w in ranges.windows(2) {
                let expected = limits.adjacency.next_start(w[0].end.cast_signed());
                assert_eq!(w[1].start.cast_signed(), expected);
            }
        },
    }

    let again = validate(&scenario.to_input(), limits);
    assert_eq!(again.as_ref(), Ok(scenario));
}

fn check_playback(scenario: &Scenario, probes: &[u64]) {
    let (start, end) = scenario.span();
    let lower = match scenario.data() {
        // Early reads hold the first value
        ScenarioData::Timepoints(_) => 0,
        ScenarioData::Ranges(_) => start,
    };

    for &elapsed in probes.iter().chain([start, end, end.saturating_add(1)].iter()) {
        let result = value_at(scenario, elapsed);
        let inside = (lower..=end).contains(&elapsed);
        assert_eq!(result.is_ok(), inside, "elapsed {elapsed} span [{start}, {end}]");

        if let Ok(value) = result {
            assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&value));
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let adjacency = if input.shared_boundary {
        RangeAdjacency::SharedBoundary
    } else {
        RangeAdjacency::Inclusive
    };
    let limits = ValidationLimits { max_points: usize::from(input.max_points.max(1)), adjacency };

    let raw = build(input.scenario, adjacency);

    // Rejection is fine; admission must satisfy every invariant
    if let Ok(scenario) = validate(&raw, &limits) {
        assert_eq!(scenario.kind(), raw.kind());
        assert_eq!(scenario.len(), raw.len());

        check_admitted(&scenario, &limits);
        check_playback(&scenario, &input.probes);
    }
});
