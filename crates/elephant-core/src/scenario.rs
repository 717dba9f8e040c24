//! Scenario types.
//!
//! A scenario describes how a simulated carbon-intensity value evolves over
//! elapsed playback time. There are two shapes:
//!
//! - Timepoints: `[offset, value]` pairs; each value holds until the next
//!   offset.
//! - Ranges: `[start, end, value]` triples tiling a contiguous timeline.
//!
//! Raw inputs carry signed integers so that negative offsets survive
//! deserialization and can be reported precisely by the validator. A
//! [`Scenario`] can only be obtained from [`crate::validation`], so holding one
//! proves the data is well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest admissible carbon-intensity value (gCO2eq/kWh).
pub const MIN_INTENSITY: f64 = 0.0;

/// Highest admissible carbon-intensity value (gCO2eq/kWh).
pub const MAX_INTENSITY: f64 = 1000.0;

/// Unvalidated timepoint as supplied by a caller.
///
/// Serialized as a two-element array `[offset, value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct RawTimepoint {
    /// Seconds since playback start.
    pub offset: i64,
    /// Carbon intensity reported from this offset on.
    pub value: f64,
}

impl RawTimepoint {
    /// Create a raw timepoint.
    pub fn new(offset: i64, value: f64) -> Self {
        Self { offset, value }
    }
}

impl From<(i64, f64)> for RawTimepoint {
    fn from((offset, value): (i64, f64)) -> Self {
        Self { offset, value }
    }
}

impl From<RawTimepoint> for (i64, f64) {
    fn from(point: RawTimepoint) -> Self {
        (point.offset, point.value)
    }
}

/// Unvalidated range as supplied by a caller.
///
/// Serialized as a three-element array `[start, end, value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, i64, f64)", into = "(i64, i64, f64)")]
pub struct RawRange {
    /// First second covered by the range.
    pub start: i64,
    /// Last second covered by the range.
    pub end: i64,
    /// Carbon intensity reported inside the range.
    pub value: f64,
}

impl RawRange {
    /// Create a raw range.
    pub fn new(start: i64, end: i64, value: f64) -> Self {
        Self { start, end, value }
    }
}

impl From<(i64, i64, f64)> for RawRange {
    fn from((start, end, value): (i64, i64, f64)) -> Self {
        Self { start, end, value }
    }
}

impl From<RawRange> for (i64, i64, f64) {
    fn from(range: RawRange) -> Self {
        (range.start, range.end, range.value)
    }
}

/// Caller-supplied scenario, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ScenarioInput {
    /// Step function defined by `[offset, value]` pairs.
    Timepoints(Vec<RawTimepoint>),
    /// Tiled timeline defined by `[start, end, value]` triples.
    Ranges(Vec<RawRange>),
}

impl ScenarioInput {
    /// Shape of this input.
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Self::Timepoints(_) => ScenarioKind::Timepoints,
            Self::Ranges(_) => ScenarioKind::Ranges,
        }
    }

    /// Number of points or ranges supplied.
    pub fn len(&self) -> usize {
        match self {
            Self::Timepoints(points) => points.len(),
            Self::Ranges(ranges) => ranges.len(),
        }
    }

    /// Whether no points or ranges were supplied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scenario shape tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// `[offset, value]` pairs.
    Timepoints,
    /// `[start, end, value]` triples.
    Ranges,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timepoints => write!(f, "timepoints"),
            Self::Ranges => write!(f, "ranges"),
        }
    }
}

/// Validated timepoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "(u64, f64)")]
pub struct Timepoint {
    /// Seconds since playback start.
    pub offset: u64,
    /// Carbon intensity reported from this offset on.
    pub value: f64,
}

impl From<Timepoint> for (u64, f64) {
    fn from(point: Timepoint) -> Self {
        (point.offset, point.value)
    }
}

/// Validated range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "(u64, u64, f64)")]
pub struct Range {
    /// First second covered.
    pub start: u64,
    /// Last second covered.
    pub end: u64,
    /// Carbon intensity reported inside the range.
    pub value: f64,
}

impl From<Range> for (u64, u64, f64) {
    fn from(range: Range) -> Self {
        (range.start, range.end, range.value)
    }
}

/// Validated scenario payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ScenarioData {
    /// Offsets strictly increasing, values in bounds.
    Timepoints(Vec<Timepoint>),
    /// Ranges contiguous under the configured adjacency rule, values in
    /// bounds.
    Ranges(Vec<Range>),
}

/// A validated, immutable scenario.
///
/// Only [`crate::validation`] constructs these. The sorted vectors double as
/// the search structure for playback, so nothing else is built per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Scenario(ScenarioData);

impl Scenario {
    pub(crate) fn from_validated(data: ScenarioData) -> Self {
        Self(data)
    }

    /// The validated payload.
    pub fn data(&self) -> &ScenarioData {
        &self.0
    }

    /// Shape of this scenario.
    pub fn kind(&self) -> ScenarioKind {
        match &self.0 {
            ScenarioData::Timepoints(_) => ScenarioKind::Timepoints,
            ScenarioData::Ranges(_) => ScenarioKind::Ranges,
        }
    }

    /// Number of points or ranges.
    pub fn len(&self) -> usize {
        match &self.0 {
            ScenarioData::Timepoints(points) => points.len(),
            ScenarioData::Ranges(ranges) => ranges.len(),
        }
    }

    /// Always false for validated scenarios; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Playback span `(start, end)` in seconds.
    ///
    /// For timepoints this is first to last offset, for ranges first start to
    /// last end.
    pub fn span(&self) -> (u64, u64) {
        match &self.0 {
            ScenarioData::Timepoints(points) => match (points.first(), points.last()) {
                (Some(first), Some(last)) => (first.offset, last.offset),
                _ => (0, 0),
            },
            ScenarioData::Ranges(ranges) => match (ranges.first(), ranges.last()) {
                (Some(first), Some(last)) => (first.start, last.end),
                _ => (0, 0),
            },
        }
    }

    /// Value of the `index`-th timepoint or range, clamped to the last one.
    pub fn point_value(&self, index: usize) -> f64 {
        let value = match &self.0 {
            ScenarioData::Timepoints(points) => {
                points.get(index).or_else(|| points.last()).map(|p| p.value)
            },
            ScenarioData::Ranges(ranges) => {
                ranges.get(index).or_else(|| ranges.last()).map(|r| r.value)
            },
        };
        // Validated scenarios are never empty
        value.unwrap_or(MIN_INTENSITY)
    }

    /// Convert back into the caller-facing input shape.
    ///
    /// Describing a session returns exactly what was submitted.
    pub fn to_input(&self) -> ScenarioInput {
        match &self.0 {
            ScenarioData::Timepoints(points) => ScenarioInput::Timepoints(
                points
                    .iter()
                    .map(|p| RawTimepoint::new(p.offset.cast_signed(), p.value))
                    .collect(),
            ),
            ScenarioData::Ranges(ranges) => ScenarioInput::Ranges(
                ranges
                    .iter()
                    .map(|r| RawRange::new(r.start.cast_signed(), r.end.cast_signed(), r.value))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_timepoints_deserialize_from_pairs() {
        let input: ScenarioInput =
            serde_json::from_str(r#"{"kind":"timepoints","data":[[1,150.0],[30,200]]}"#)
                .expect("decode");

        assert_eq!(
            input,
            ScenarioInput::Timepoints(vec![
                RawTimepoint::new(1, 150.0),
                RawTimepoint::new(30, 200.0)
            ])
        );
    }

    #[test]
    fn raw_ranges_deserialize_from_triples() {
        let ranges: Vec<RawRange> =
            serde_json::from_str("[[0,3600,150],[3601,7200,200]]").expect("decode");

        assert_eq!(ranges, vec![RawRange::new(0, 3600, 150.0), RawRange::new(3601, 7200, 200.0)]);
    }

    #[test]
    fn negative_offsets_survive_deserialization() {
        let points: Vec<RawTimepoint> = serde_json::from_str("[[-5,10]]").expect("decode");
        assert_eq!(points[0].offset, -5);
    }

    #[test]
    fn kind_display() {
        assert_eq!(ScenarioKind::Timepoints.to_string(), "timepoints");
        assert_eq!(ScenarioKind::Ranges.to_string(), "ranges");
    }
}
