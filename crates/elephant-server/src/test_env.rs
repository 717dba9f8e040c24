//! Controllable environment for unit tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use elephant_core::Environment;
use parking_lot::Mutex;

/// Manual clock starting at 2024-01-01T00:00:00Z with counter-based ids.
///
/// `sleep` advances the clock instead of waiting.
#[derive(Clone)]
pub(crate) struct TestEnv {
    now: Arc<Mutex<DateTime<Utc>>>,
    next_id: Arc<AtomicU64>,
    /// Every draw yields zero bytes, like a failed entropy source.
    constant: bool,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Self {
            now: Arc::new(Mutex::new(start)),
            next_id: Arc::new(AtomicU64::new(1)),
            constant: false,
        }
    }

    pub(crate) fn constant_ids() -> Self {
        Self { constant: true, ..Self::new() }
    }

    pub(crate) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Environment for TestEnv {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(TimeDelta::from_std(duration).unwrap());
        tokio::task::yield_now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        if self.constant {
            buffer.fill(0);
            return;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_be_bytes();
        buffer.fill(0);
        for (dst, src) in buffer.iter_mut().rev().zip(id.iter().rev()) {
            *dst = *src;
        }
    }
}
