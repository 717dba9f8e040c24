//! Model session store - the reference implementation.

use elephant_server::SimulationConfig;

use super::operation::{
    Operation, OperationError, OperationResult, ScenarioShape, SlotId, step_budget,
};

/// Observable state for oracle comparison.
///
/// This is the subset of store state that can be compared against the real
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// `(slot, access_count)` of every live session, in creation order.
    pub live: Vec<(usize, u64)>,
    /// Sessions still held in memory, expired or not.
    pub stored: usize,
}

#[derive(Debug, Clone)]
struct ModelSession {
    shape: ScenarioShape,
    expires_at: u64,
    access_count: u64,
    /// Not yet removed or purged.
    stored: bool,
    /// Stepped playback position.
    cursor: usize,
    /// Reads of the point under the cursor.
    reads: u32,
    /// Reads per point before the cursor moves on; `None` holds.
    budget: Option<u32>,
}

impl ModelSession {
    fn move_next(&mut self) {
        if self.cursor + 1 < self.shape.len() {
            self.cursor += 1;
            self.reads = 0;
        }
    }

    fn is_live(&self, now: u64) -> bool {
        self.stored && now <= self.expires_at
    }

    fn is_expired(&self, now: u64) -> bool {
        self.stored && now > self.expires_at
    }
}

/// Model session store.
///
/// Every session ever created keeps its slot, so operations can target
/// removed or expired sessions.
#[derive(Debug, Clone)]
pub struct ModelStore {
    /// Seconds since the start of the run.
    now: u64,
    lifetime: u64,
    max_points: usize,
    max_sessions: usize,
    sessions: Vec<ModelSession>,
}

impl ModelStore {
    /// Empty store enforcing the limits in `config`.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            now: 0,
            lifetime: config.session_expiry_hours.saturating_mul(3600),
            max_points: config.max_data_points,
            max_sessions: config.max_concurrent_sessions,
            sessions: Vec::new(),
        }
    }

    /// Number of sessions created so far.
    pub fn created(&self) -> usize {
        self.sessions.len()
    }

    /// Resolve a slot to a session index.
    pub fn resolve(&self, slot: SlotId) -> Option<usize> {
        (!self.sessions.is_empty()).then(|| usize::from(slot) % self.sessions.len())
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Create { shape } => self.apply_create(shape, None),
            Operation::CreateStepped { shape, budget } => {
                self.apply_create(shape, step_budget(budget))
            },
            Operation::Step { slot } => self.apply_step(slot, false),
            Operation::Advance { slot } => self.apply_step(slot, true),
            Operation::Read { slot, elapsed } => self.apply_read(slot, u64::from(elapsed)),
            Operation::Remove { slot } => self.apply_remove(slot),
            Operation::AdvanceTime { minutes } => {
                self.now += u64::from(minutes) * 60;
                OperationResult::Advanced
            },
            Operation::Purge => OperationResult::Purged(self.purge()),
        }
    }

    fn apply_create(&mut self, shape: ScenarioShape, budget: Option<u32>) -> OperationResult {
        if shape.is_empty() || shape.len() > self.max_points {
            return OperationResult::Error(OperationError::InvalidScenario);
        }

        self.purge();
        let live = self.sessions.iter().filter(|s| s.stored).count();
        if live >= self.max_sessions {
            return OperationResult::Error(OperationError::CapacityExceeded);
        }

        self.sessions.push(ModelSession {
            shape,
            expires_at: self.now + self.lifetime,
            access_count: 0,
            stored: true,
            cursor: 0,
            reads: 0,
            budget,
        });
        OperationResult::Created
    }

    fn apply_read(&mut self, slot: SlotId, elapsed: u64) -> OperationResult {
        let now = self.now;
        let Some(session) = self.resolve(slot).and_then(|i| self.sessions.get_mut(i)) else {
            return OperationResult::Error(OperationError::NotFound);
        };
        if !session.is_live(now) {
            return OperationResult::Error(OperationError::NotFound);
        }

        let last = ScenarioShape::offset(session.shape.len() - 1);
        if elapsed > last {
            return OperationResult::Error(OperationError::OutOfRange);
        }

        let index = usize::try_from(elapsed / ScenarioShape::STEP).unwrap_or(usize::MAX);
        session.access_count += 1;
        OperationResult::Value(session.shape.value(index))
    }

    fn apply_step(&mut self, slot: SlotId, advance: bool) -> OperationResult {
        let now = self.now;
        let Some(session) = self.resolve(slot).and_then(|i| self.sessions.get_mut(i)) else {
            return OperationResult::Error(OperationError::NotFound);
        };
        if !session.is_live(now) {
            return OperationResult::Error(OperationError::NotFound);
        }

        session.access_count += 1;
        if advance {
            session.move_next();
            return OperationResult::Step(session.cursor, session.shape.value(session.cursor));
        }

        let served = OperationResult::Step(session.cursor, session.shape.value(session.cursor));
        if let Some(budget) = session.budget {
            session.reads += 1;
            if session.reads >= budget {
                session.move_next();
            }
        }
        served
    }

    fn apply_remove(&mut self, slot: SlotId) -> OperationResult {
        let Some(session) = self.resolve(slot).and_then(|i| self.sessions.get_mut(i)) else {
            return OperationResult::Removed(false);
        };
        // Expired sessions not yet swept are still removable
        let found = session.stored;
        session.stored = false;
        OperationResult::Removed(found)
    }

    fn purge(&mut self) -> usize {
        let now = self.now;
        let mut reclaimed = 0;
        for session in self.sessions.iter_mut().filter(|s| s.is_expired(now)) {
            session.stored = false;
            reclaimed += 1;
        }
        reclaimed
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let live = self
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_live(self.now))
            .map(|(slot, s)| (slot, s.access_count))
            .collect();
        let stored = self.sessions.iter().filter(|s| s.stored).count();

        ObservableState { live, stored }
    }
}
