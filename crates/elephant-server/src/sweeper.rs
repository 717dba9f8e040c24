//! Expiry sweeper.
//!
//! Periodically reclaims memory held by expired sessions. Liveness never
//! depends on the sweeper: every store access path checks expiry itself, so a
//! late or skipped sweep only delays reclamation.

use std::{sync::Arc, time::Duration};

use elephant_core::Environment;
use tokio::sync::watch;

use crate::store::SessionStore;

/// Background task removing expired sessions from a [`SessionStore`].
pub struct ExpirySweeper<E>
where
    E: Environment,
{
    store: Arc<SessionStore<E>>,
    interval: Duration,
}

impl<E> ExpirySweeper<E>
where
    E: Environment,
{
    /// Create a sweeper running every `interval`.
    pub fn new(store: Arc<SessionStore<E>>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Sweep period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep. Returns the number of sessions reclaimed.
    pub fn sweep_once(&self) -> usize {
        let reclaimed = self.store.purge_expired();
        if reclaimed > 0 {
            tracing::info!(reclaimed, remaining = self.store.stored_count(), "expired sessions swept");
        } else {
            tracing::debug!("sweep found no expired sessions");
        }
        reclaimed
    }

    /// Sweep every interval until `shutdown` becomes `true` or its sender is
    /// dropped. Returns the total number of sessions reclaimed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        tracing::info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");

        let env = self.store.env().clone();
        let mut total = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                () = env.sleep(self.interval) => {
                    total += self.sweep_once();
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
            }
        }

        tracing::info!(total, "expiry sweeper stopped");
        total
    }
}

impl<E> std::fmt::Debug for ExpirySweeper<E>
where
    E: Environment,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper").field("interval", &self.interval).finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use elephant_core::{RawTimepoint, ValidationLimits, validate_timepoints};

    use super::*;
    use crate::{store::StoreLimits, test_env::TestEnv};

    fn store(env: &TestEnv) -> Arc<SessionStore<TestEnv>> {
        Arc::new(SessionStore::new(
            env.clone(),
            StoreLimits { session_lifetime: TimeDelta::hours(1), max_sessions: 10, max_history: 0 },
        ))
    }

    fn create(store: &SessionStore<TestEnv>) {
        let points = [RawTimepoint::new(0, 100.0)];
        let scenario = validate_timepoints(&points, &ValidationLimits::default()).unwrap();
        store.create(None, scenario).unwrap();
    }

    #[test]
    fn sweep_once_reclaims_expired() {
        let env = TestEnv::new();
        let store = store(&env);
        create(&store);
        create(&store);

        let sweeper = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(), 0);

        env.advance(TimeDelta::minutes(61));
        assert_eq!(sweeper.sweep_once(), 2);
        assert_eq!(store.stored_count(), 0);
    }

    #[tokio::test]
    async fn run_sweeps_until_shutdown() {
        let env = TestEnv::new();
        let store = store(&env);
        create(&store);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(300));
        let handle = tokio::spawn(sweeper.run(shutdown_rx));

        // Each sweeper sleep advances the virtual clock by five minutes
        while store.stored_count() > 0 {
            tokio::task::yield_now().await;
        }

        shutdown_tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn run_stops_when_sender_dropped() {
        let env = TestEnv::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = ExpirySweeper::new(store(&env), Duration::from_secs(60));
        let handle = tokio::spawn(sweeper.run(shutdown_rx));

        drop(shutdown_tx);
        assert_eq!(handle.await.unwrap(), 0);
    }
}
