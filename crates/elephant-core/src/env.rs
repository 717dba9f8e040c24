//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples the simulation engine from system
//! resources (wall-clock time, randomness, timers). This enables:
//!
//! - Deterministic Simulation: the harness provides a virtual UTC clock and a
//!   seeded RNG, so expiry and identifier generation replay exactly.
//!
//! - Production Runtime: the server implementation uses the system clock,
//!   tokio timers and OS entropy without any change to store or facade code.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Abstract environment providing UTC time, randomness, and async sleeping.
///
/// Session stores, sweepers and facades are generic over this trait. Tests
/// inject a controllable clock; production injects the system clock.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. Time monotonicity: `now()` never goes backwards
/// 2. RNG quality: `random_bytes()` uses OS entropy in production, since
///    session identifiers are bearer tokens for scenario access
/// 3. Minimal panics: Methods are infallible
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current UTC time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: Subsequent calls must return times >= previous calls.
    fn now(&self) -> DateTime<Utc>;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it is only used by
    /// driver code (the expiry sweeper loop), never by store operations.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Determinism during simulations: Given the same RNG seed, this produces
    ///   the same sequence of bytes
    /// - Unpredictability in production: Uses OS entropy (`getrandom`)
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates random bytes for a 128-bit identifier.
    ///
    /// Used for session IDs.
    fn random_id_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        bytes
    }
}
