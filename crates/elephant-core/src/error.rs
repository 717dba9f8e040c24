//! Error types for scenario validation and playback.

use thiserror::Error;

/// Reasons a scenario is rejected before it is admitted to the store.
///
/// Variants are reported in rule order: size first, then ordering and
/// adjacency, then value bounds. The first failing rule wins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Scenario is empty or longer than the configured ceiling.
    #[error("scenario has {len} entries, expected 1..={max}")]
    SizeExceeded {
        /// Number of entries supplied.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Two consecutive timepoints share an offset.
    #[error("duplicate timepoint offset {offset} at index {index}")]
    DuplicateTimepoint {
        /// Index of the second occurrence.
        index: usize,
        /// The repeated offset.
        offset: i64,
    },

    /// Timepoint offsets decrease.
    #[error("timepoint at index {index} (offset {offset}) precedes offset {previous}")]
    TimepointsOutOfOrder {
        /// Index of the offending timepoint.
        index: usize,
        /// Its offset.
        offset: i64,
        /// Offset of the timepoint before it.
        previous: i64,
    },

    /// A timepoint offset or range start is negative.
    #[error("negative offset {offset} at index {index}")]
    InvalidOffset {
        /// Index of the offending entry.
        index: usize,
        /// The negative offset.
        offset: i64,
    },

    /// A range does not end after it starts.
    #[error("range at index {index} has start {start} >= end {end}")]
    EmptyRange {
        /// Index of the offending range.
        index: usize,
        /// Range start.
        start: i64,
        /// Range end.
        end: i64,
    },

    /// Consecutive ranges leave uncovered seconds between them.
    #[error("gap before range at index {index}: expected start {expected_start}, got {start}")]
    RangeGap {
        /// Index of the range after the gap.
        index: usize,
        /// Start required by the adjacency rule.
        expected_start: i64,
        /// Actual start.
        start: i64,
    },

    /// Consecutive ranges cover the same seconds or run backwards.
    #[error("range at index {index} starts at {start}, overlapping previous end {previous_end}")]
    RangeOverlap {
        /// Index of the overlapping range.
        index: usize,
        /// End of the preceding range.
        previous_end: i64,
        /// Start of the overlapping range.
        start: i64,
    },

    /// A value is outside `[0, 1000]` or not finite.
    #[error("value {value} at index {index} outside [0, 1000]")]
    ValueOutOfBounds {
        /// Index of the offending entry.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// More call thresholds than scenario points.
    #[error("{thresholds} call thresholds for {points} points")]
    TooManyThresholds {
        /// Thresholds supplied.
        thresholds: usize,
        /// Points in the scenario.
        points: usize,
    },
}

/// Errors computing a scenario value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Elapsed time falls outside the scenario's defined span.
    #[error("elapsed {elapsed}s outside scenario span [{start}, {end}]")]
    ElapsedOutOfRange {
        /// Requested elapsed seconds.
        elapsed: u64,
        /// First second with a defined value.
        start: u64,
        /// Last second with a defined value.
        end: u64,
    },
}
