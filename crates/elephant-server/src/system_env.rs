//! Production Environment implementation using system time and RNG.
//!
//! This module provides `SystemEnv`, the production implementation of the
//! `Environment` trait that uses the real UTC clock and OS entropy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use elephant_core::Environment;

/// Production environment using the system clock and cryptographic RNG.
///
/// This implementation:
/// - Uses `chrono::Utc::now()` for time
/// - Uses `tokio::time::sleep()` for the sweeper's timer
/// - Uses `getrandom` for session identifiers
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // NOTE: never observed on supported platforms. Zeroed ids collide
            // after the first session; the store gives up after a bounded
            // number of draws and reports `IdExhausted`.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}
