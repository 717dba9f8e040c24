//! Simulation facade.
//!
//! `SimulationService` is the surface consumed by the HTTP layer. It composes
//! the validator, the session store and the playback engine:
//!
//! ```text
//! create:        input ─▶ validate ─▶ SessionStore::create
//! current_value: SessionStore::get ─▶ value_at ─▶ SessionStore::record_access
//! next_value:    SessionStore::step(Read)     (cursor, call thresholds)
//! advance:       SessionStore::step(Advance)
//! ```
//!
//! Errors from each layer pass through unchanged inside [`SimulationError`];
//! [`SimulationError::class`] maps them to caller-visible categories.

use std::{sync::Arc, time::Duration};

use elephant_core::{
    CallThresholds, Environment, PlaybackError, RawRange, RawTimepoint, Scenario, ScenarioInput,
    ValidationError, ValidationLimits, validate, value_at,
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::SimulationConfig,
    store::{
        AccessRecord, PlaybackPoint, SessionError, SessionId, SessionStore, SessionSummary,
        StepMode,
    },
    sweeper::ExpirySweeper,
};

/// Lifecycle state reported by `describe`.
///
/// Expired and deleted sessions are reported as not found, so every session
/// a caller can see is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is live and readable.
    Active,
}

/// Full view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    /// Summary fields.
    #[serde(flatten)]
    pub summary: SessionSummary,
    /// The validated scenario, as submitted.
    pub scenario: Scenario,
    /// Lifecycle state.
    pub status: SessionStatus,
}

/// Value reported for a session at an elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentValue {
    /// Session queried.
    pub session_id: SessionId,
    /// Elapsed seconds requested.
    pub elapsed: u64,
    /// Simulated carbon intensity.
    pub carbon_intensity: f64,
}

/// Point served by stepped playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepValue {
    /// Session queried.
    pub session_id: SessionId,
    /// Index of the timepoint or range served.
    pub index: usize,
    /// Simulated carbon intensity.
    pub carbon_intensity: f64,
}

/// Live sessions plus their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionList {
    /// Summaries in creation order.
    pub sessions: Vec<SessionSummary>,
    /// Number of live sessions.
    pub total: usize,
}

/// Caller-visible error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed scenario or elapsed time outside the scenario.
    BadRequest,
    /// Unknown or expired session.
    NotFound,
    /// Session capacity exhausted.
    Conflict,
    /// No session identifier could be allocated.
    Unavailable,
}

impl ErrorClass {
    /// HTTP status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unavailable => 503,
        }
    }
}

/// Errors from SimulationService operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Scenario rejected by the validator
    #[error("invalid scenario: {0}")]
    Validation(#[from] ValidationError),

    /// Playback failed
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Session store rejected the operation
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl SimulationError {
    /// Category for the boundary layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::Playback(_) => ErrorClass::BadRequest,
            Self::Session(SessionError::NotFound(_)) => ErrorClass::NotFound,
            Self::Session(SessionError::CapacityExceeded { .. }) => ErrorClass::Conflict,
            Self::Session(SessionError::IdExhausted { .. }) => ErrorClass::Unavailable,
        }
    }
}

/// Create, describe, replay and list simulation sessions.
pub struct SimulationService<E>
where
    E: Environment,
{
    store: Arc<SessionStore<E>>,
    limits: ValidationLimits,
    cleanup_interval: Duration,
}

impl<E> SimulationService<E>
where
    E: Environment,
{
    /// Build a service with its own store.
    pub fn new(env: E, config: &SimulationConfig) -> Self {
        Self {
            store: Arc::new(SessionStore::new(env, config.store_limits())),
            limits: config.validation_limits(),
            cleanup_interval: config.cleanup_interval(),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<SessionStore<E>> {
        &self.store
    }

    /// A sweeper for the backing store, using the configured interval.
    pub fn sweeper(&self) -> ExpirySweeper<E> {
        ExpirySweeper::new(Arc::clone(&self.store), self.cleanup_interval)
    }

    /// Validate and store a tagged scenario.
    pub fn create(
        &self,
        description: Option<String>,
        input: &ScenarioInput,
    ) -> Result<SessionSummary, SimulationError> {
        let scenario = validate(input, &self.limits).inspect_err(|e| {
            tracing::debug!(kind = %input.kind(), error = %e, "scenario rejected");
        })?;
        Ok(self.store.create(description, scenario)?)
    }

    /// Validate and store a scenario for stepped playback.
    ///
    /// `thresholds` gives, per point, how many reads it serves before
    /// [`SimulationService::next_value`] moves on by itself.
    pub fn create_stepped(
        &self,
        description: Option<String>,
        input: &ScenarioInput,
        thresholds: CallThresholds,
    ) -> Result<SessionSummary, SimulationError> {
        let scenario = validate(input, &self.limits)
            .and_then(|scenario| thresholds.check(&scenario).map(|()| scenario))
            .inspect_err(|e| {
                tracing::debug!(kind = %input.kind(), error = %e, "scenario rejected");
            })?;
        Ok(self.store.create_with_thresholds(description, scenario, thresholds)?)
    }

    /// Validate and store a timepoint scenario.
    pub fn create_from_timepoints(
        &self,
        description: Option<String>,
        points: Vec<RawTimepoint>,
    ) -> Result<SessionSummary, SimulationError> {
        self.create(description, &ScenarioInput::Timepoints(points))
    }

    /// Validate and store a range scenario.
    pub fn create_from_ranges(
        &self,
        description: Option<String>,
        ranges: Vec<RawRange>,
    ) -> Result<SessionSummary, SimulationError> {
        self.create(description, &ScenarioInput::Ranges(ranges))
    }

    /// Full scenario and status of a live session.
    pub fn describe(&self, id: &SessionId) -> Result<SessionDetail, SimulationError> {
        let session = self.store.get(id)?;
        Ok(SessionDetail {
            summary: session.summary(),
            scenario: Scenario::clone(&session.scenario),
            status: SessionStatus::Active,
        })
    }

    /// Value the session reports after `elapsed` seconds. Counts as an access.
    ///
    /// Out-of-range requests are not counted.
    pub fn current_value(
        &self,
        id: &SessionId,
        elapsed: u64,
    ) -> Result<CurrentValue, SimulationError> {
        let session = self.store.get(id)?;
        let carbon_intensity = value_at(&session.scenario, elapsed)?;
        self.store.record_access(id, PlaybackPoint::Elapsed(elapsed), carbon_intensity)?;

        tracing::debug!(session_id = %id, elapsed, carbon_intensity, "simulated value served");

        Ok(CurrentValue { session_id: *id, elapsed, carbon_intensity })
    }

    /// Value at the session's playback cursor. Counts as an access.
    ///
    /// The cursor moves on once the point's call threshold is used up.
    pub fn next_value(&self, id: &SessionId) -> Result<StepValue, SimulationError> {
        self.step(id, StepMode::Read)
    }

    /// Move the playback cursor one point on and return the new value.
    ///
    /// On the last point the cursor stays and the last value is returned.
    pub fn advance(&self, id: &SessionId) -> Result<StepValue, SimulationError> {
        self.step(id, StepMode::Advance)
    }

    fn step(&self, id: &SessionId, mode: StepMode) -> Result<StepValue, SimulationError> {
        let (_, step) = self.store.step(id, mode)?;
        tracing::debug!(session_id = %id, ?mode, index = step.index, "stepped value served");
        Ok(StepValue { session_id: *id, index: step.index, carbon_intensity: step.value })
    }

    /// All live sessions in creation order.
    pub fn list_active(&self) -> SessionList {
        let sessions = self.store.list();
        let total = sessions.len();
        SessionList { sessions, total }
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete(&self, id: &SessionId) -> bool {
        self.store.remove(id)
    }

    /// Successful reads of a live session, oldest first.
    pub fn history(&self, id: &SessionId) -> Result<Vec<AccessRecord>, SimulationError> {
        Ok(self.store.history(id)?)
    }
}

impl<E> std::fmt::Debug for SimulationService<E>
where
    E: Environment,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationService")
            .field("store", &self.store)
            .field("limits", &self.limits)
            .finish()
    }
}
