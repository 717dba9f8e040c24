//! Simulated environment.
//!
//! Time only moves when a test calls [`SimEnv::advance`] or a driver awaits
//! [`Environment::sleep`]. Randomness comes from a seeded ChaCha stream, so a
//! seed fully determines the session identifiers a run produces.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use elephant_core::Environment;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// 2024-01-01T00:00:00Z
const EPOCH_SECS: i64 = 1_704_067_200;

/// Virtual clock and seeded RNG.
///
/// Clones share the same clock and RNG stream.
#[derive(Clone)]
pub struct SimEnv {
    now: Arc<Mutex<DateTime<Utc>>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Environment seeded with zero.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment whose identifier stream is determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let start = DateTime::from_timestamp(EPOCH_SECS, 0).unwrap_or_default();
        Self {
            now: Arc::new(Mutex::new(start)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock forward. Saturates at the maximum representable time.
    pub fn advance(&self, duration: Duration) {
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock();
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Seconds elapsed since the simulation epoch.
    pub fn elapsed_secs(&self) -> i64 {
        self.now.lock().timestamp() - EPOCH_SECS
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEnv").field("now", &*self.now.lock()).finish_non_exhaustive()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        // Virtual time: the deadline is reached immediately, then the task
        // yields so other tasks observe the new time.
        self.advance(duration);
        tokio::task::yield_now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().fill_bytes(buffer);
    }
}
