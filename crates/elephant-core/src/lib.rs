//! Elephant core: carbon-intensity scenario validation and playback.
//!
//! This crate is Sans-IO. It owns the scenario data model, the validator that
//! admits scenarios, the playback engine that replays them, and the
//! `Environment` abstraction that session stores use for time and
//! randomness. It holds no shared state and performs no I/O.
//!
//! ## Architecture
//!
//! ```text
//! elephant-core
//!   ├─ Environment   (clock, RNG, sleep)
//!   ├─ scenario      (raw input, validated Scenario)
//!   ├─ validation    (rule-ordered checks)
//!   ├─ playback      (value_at, O(log n))
//!   └─ step          (cursor playback, call thresholds)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod playback;
pub mod scenario;
pub mod step;
pub mod validation;

pub use env::Environment;
pub use error::{PlaybackError, ValidationError};
pub use playback::value_at;
pub use scenario::{
    MAX_INTENSITY, MIN_INTENSITY, Range, RawRange, RawTimepoint, Scenario, ScenarioData,
    ScenarioInput, ScenarioKind, Timepoint,
};
pub use step::{CallThresholds, Step, StepCursor};
pub use validation::{
    RangeAdjacency, ValidationLimits, validate, validate_ranges, validate_timepoints,
};
