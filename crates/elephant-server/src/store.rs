//! Session Store
//!
//! Owns every simulation session. Callers only ever receive owned snapshots.
//!
//! ## Responsibilities
//!
//! - Session Lifecycle: create with a fresh identifier, remove idempotently
//! - Liveness: expiry is a derived predicate (`now > expires_at`) checked on
//!   every access path, so expired sessions are absent before any sweep
//! - Capacity: reject creation once `max_sessions` live sessions exist, never
//!   evict another caller's session
//! - Access Tracking: count reads, stamp the last access, keep a bounded
//!   history
//!
//! ## Locking
//!
//! ```text
//! RwLock<SessionMap>                  shared: get, list, record_access, step
//!   └─ Arc<SessionEntry>              exclusive: create, remove, purge
//!        ├─ immutable fields          (id, scenario, timestamps)
//!        └─ Mutex<AccessState>        per-session counter + history
//! ```
//!
//! Reads of different sessions only share the map read lock. The map length
//! under the write lock is the live-session counter used by `create`, so the
//! capacity check is consistent with concurrent creates and removes.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, TimeDelta, Utc};
use elephant_core::{CallThresholds, Environment, Scenario, ScenarioKind, Step, StepCursor};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use uuid::Uuid;

/// Identifier draws per create before giving up.
const MAX_ID_ATTEMPTS: usize = 8;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Build a random (version 4) identifier from 16 random bytes.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Limits applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Time from creation to expiry.
    pub session_lifetime: TimeDelta,
    /// Maximum number of live sessions.
    pub max_sessions: usize,
    /// Access records retained per session (0 disables history).
    pub max_history: usize,
}

/// Where a read landed in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPoint {
    /// Elapsed-time read, in seconds.
    Elapsed(u64),
    /// Stepped read of the point at this index.
    Step(usize),
}

/// One successful read of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccessRecord {
    /// When the read happened.
    pub at: DateTime<Utc>,
    /// What was read.
    pub point: PlaybackPoint,
    /// Carbon intensity reported.
    pub value: f64,
}

/// Snapshot of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Identifier.
    pub id: SessionId,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Validated scenario, shared immutably.
    pub scenario: Arc<Scenario>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Number of successful reads.
    pub access_count: u64,
    /// Time of the most recent successful read.
    pub last_accessed: Option<DateTime<Utc>>,
    /// Current stepped-playback point.
    pub step_index: usize,
}

impl Session {
    /// Condensed view for listings.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            description: self.description.clone(),
            kind: self.scenario.kind(),
            point_count: self.scenario.len(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            access_count: self.access_count,
            last_accessed: self.last_accessed,
            step_index: self.step_index,
        }
    }
}

/// Condensed session view returned by create and list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Identifier.
    pub id: SessionId,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Scenario shape.
    pub kind: ScenarioKind,
    /// Number of timepoints or ranges.
    pub point_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Number of successful reads.
    pub access_count: u64,
    /// Time of the most recent successful read.
    pub last_accessed: Option<DateTime<Utc>>,
    /// Current stepped-playback point.
    pub step_index: usize,
}

/// Stepped-playback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Serve the current point, honouring call thresholds.
    Read,
    /// Move to the next point and serve it.
    Advance,
}

/// Errors from SessionStore operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session is unknown or expired
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// Store already holds the maximum number of live sessions
    #[error("session limit reached: {limit} active sessions")]
    CapacityExceeded {
        /// Configured maximum
        limit: usize,
    },

    /// Every identifier drawn was already taken
    #[error("no unused session id after {attempts} attempts")]
    IdExhausted {
        /// Identifiers drawn
        attempts: usize,
    },
}

#[derive(Debug, Default)]
struct AccessState {
    count: u64,
    last_accessed: Option<DateTime<Utc>>,
    history: VecDeque<AccessRecord>,
    cursor: StepCursor,
}

impl AccessState {
    fn record(&mut self, at: DateTime<Utc>, point: PlaybackPoint, value: f64, max_history: usize) {
        self.count += 1;
        self.last_accessed = Some(at);

        if max_history > 0 {
            if self.history.len() >= max_history {
                self.history.pop_front();
            }
            self.history.push_back(AccessRecord { at, point, value });
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    id: SessionId,
    description: Option<String>,
    scenario: Arc<Scenario>,
    thresholds: CallThresholds,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Creation order, for listing.
    sequence: u64,
    access: Mutex<AccessState>,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    fn snapshot(&self, access: &AccessState) -> Session {
        Session {
            id: self.id,
            description: self.description.clone(),
            scenario: Arc::clone(&self.scenario),
            created_at: self.created_at,
            expires_at: self.expires_at,
            access_count: access.count,
            last_accessed: access.last_accessed,
            step_index: access.cursor.index(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionMap {
    entries: HashMap<SessionId, Arc<SessionEntry>>,
    next_sequence: u64,
}

impl SessionMap {
    fn live(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<&Arc<SessionEntry>, SessionError> {
        self.entries
            .get(id)
            .filter(|entry| !entry.is_expired(now))
            .ok_or(SessionError::NotFound(*id))
    }
}

/// Concurrent, in-memory store of simulation sessions.
pub struct SessionStore<E>
where
    E: Environment,
{
    env: E,
    limits: StoreLimits,
    sessions: RwLock<SessionMap>,
}

impl<E> SessionStore<E>
where
    E: Environment,
{
    /// Create an empty store.
    pub fn new(env: E, limits: StoreLimits) -> Self {
        Self { env, limits, sessions: RwLock::new(SessionMap::default()) }
    }

    /// The environment supplying time and identifiers.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The limits this store enforces.
    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    /// Store a validated scenario under a fresh identifier.
    ///
    /// Expired sessions still held in memory are dropped first so they never
    /// count against capacity.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CapacityExceeded` if `max_sessions` live
    /// sessions already exist.
    pub fn create(
        &self,
        description: Option<String>,
        scenario: Scenario,
    ) -> Result<SessionSummary, SessionError> {
        self.create_with_thresholds(description, scenario, CallThresholds::default())
    }

    /// Store a validated scenario with call thresholds for stepped playback.
    ///
    /// # Errors
    ///
    /// As [`SessionStore::create`], plus `SessionError::IdExhausted` when every
    /// identifier drawn is already taken, which only happens if the
    /// environment's randomness is degraded.
    pub fn create_with_thresholds(
        &self,
        description: Option<String>,
        scenario: Scenario,
        thresholds: CallThresholds,
    ) -> Result<SessionSummary, SessionError> {
        let now = self.env.now();
        let mut map = self.sessions.write();

        map.entries.retain(|_, entry| !entry.is_expired(now));

        if map.entries.len() >= self.limits.max_sessions {
            tracing::warn!(limit = self.limits.max_sessions, "session capacity reached");
            return Err(SessionError::CapacityExceeded { limit: self.limits.max_sessions });
        }

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| SessionId::from_random_bytes(self.env.random_id_bytes()))
            .find(|candidate| !map.entries.contains_key(candidate))
            .ok_or_else(|| {
                tracing::error!(attempts = MAX_ID_ATTEMPTS, "no unused session id drawn");
                SessionError::IdExhausted { attempts: MAX_ID_ATTEMPTS }
            })?;

        let sequence = map.next_sequence;
        map.next_sequence += 1;

        let entry = Arc::new(SessionEntry {
            id,
            description,
            scenario: Arc::new(scenario),
            thresholds,
            created_at: now,
            expires_at: now
                .checked_add_signed(self.limits.session_lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            sequence,
            access: Mutex::new(AccessState::default()),
        });

        let summary = entry.snapshot(&AccessState::default()).summary();
        map.entries.insert(id, entry);

        tracing::info!(
            session_id = %id,
            kind = %summary.kind,
            points = summary.point_count,
            expires_at = %summary.expires_at,
            "session created"
        );

        Ok(summary)
    }

    /// Fetch a snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the id is unknown or expired.
    pub fn get(&self, id: &SessionId) -> Result<Session, SessionError> {
        let now = self.env.now();
        let map = self.sessions.read();
        let entry = map.live(id, now)?;
        let access = entry.access.lock();
        Ok(entry.snapshot(&access))
    }

    /// Count a successful read of a session.
    ///
    /// Increments the access counter, stamps `last_accessed`, and appends to
    /// the bounded history. Returns the updated snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the session expired or was removed
    /// since it was fetched.
    pub fn record_access(
        &self,
        id: &SessionId,
        point: PlaybackPoint,
        value: f64,
    ) -> Result<Session, SessionError> {
        let now = self.env.now();
        let map = self.sessions.read();
        let entry = map.live(id, now)?;

        let mut access = entry.access.lock();
        access.record(now, point, value, self.limits.max_history);

        Ok(entry.snapshot(&access))
    }

    /// Serve a session's stepped-playback point and count the access.
    ///
    /// The cursor moves and the access is recorded under the session's lock,
    /// so concurrent steps each see a distinct cursor state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the id is unknown or expired.
    pub fn step(&self, id: &SessionId, mode: StepMode) -> Result<(Session, Step), SessionError> {
        let now = self.env.now();
        let map = self.sessions.read();
        let entry = map.live(id, now)?;

        let mut access = entry.access.lock();
        let step = match mode {
            StepMode::Read => access.cursor.read(&entry.scenario, &entry.thresholds),
            StepMode::Advance => access.cursor.advance(&entry.scenario),
        };
        access.record(now, PlaybackPoint::Step(step.index), step.value, self.limits.max_history);

        Ok((entry.snapshot(&access), step))
    }

    /// Access history of a live session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the id is unknown or expired.
    pub fn history(&self, id: &SessionId) -> Result<Vec<AccessRecord>, SessionError> {
        let now = self.env.now();
        let map = self.sessions.read();
        let entry = map.live(id, now)?;
        let access = entry.access.lock();
        Ok(access.history.iter().copied().collect())
    }

    /// Summaries of all live sessions in creation order.
    pub fn list(&self) -> Vec<SessionSummary> {
        let now = self.env.now();
        let map = self.sessions.read();

        let mut live: Vec<(u64, SessionSummary)> = map
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| {
                let access = entry.access.lock();
                (entry.sequence, entry.snapshot(&access).summary())
            })
            .collect();
        live.sort_unstable_by_key(|(sequence, _)| *sequence);

        live.into_iter().map(|(_, summary)| summary).collect()
    }

    /// Delete a session. Returns whether it was present.
    ///
    /// Removing an unknown id is a no-op.
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().entries.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session removed");
        }
        removed
    }

    /// Drop every expired session. Returns how many were dropped.
    ///
    /// Uses the same `now > expires_at` predicate as `get`, so a session that
    /// is still readable at its expiry instant is not reclaimed at that instant.
    ///
    /// Candidates are collected under the read lock; the write lock is only
    /// held while the batch is removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.env.now();

        let expired: Vec<SessionId> = {
            let map = self.sessions.read();
            map.entries
                .values()
                .filter(|entry| entry.is_expired(now))
                .map(|entry| entry.id)
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        let mut map = self.sessions.write();
        expired.iter().filter(|id| map.entries.remove(*id).is_some()).count()
    }

    /// Number of live sessions.
    pub fn live_count(&self) -> usize {
        let now = self.env.now();
        self.sessions.read().entries.values().filter(|entry| !entry.is_expired(now)).count()
    }

    /// Number of sessions held in memory, including expired ones not yet
    /// purged.
    pub fn stored_count(&self) -> usize {
        self.sessions.read().entries.len()
    }
}

impl<E> fmt::Debug for SessionStore<E>
where
    E: Environment,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_count", &self.stored_count())
            .field("limits", &self.limits)
            .finish()
    }
}
