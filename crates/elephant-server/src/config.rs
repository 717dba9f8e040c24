//! Simulation engine configuration.
//!
//! Values are supplied at process start, either by the external configuration
//! loader (which deserializes this struct from its own file format) or by the
//! `elephant-server` command line. Missing fields fall back to defaults.

use std::time::Duration;

use chrono::TimeDelta;
use elephant_core::{RangeAdjacency, ValidationLimits};
use serde::Deserialize;
use thiserror::Error;

use crate::store::StoreLimits;

/// Longest accepted session lifetime (one year).
const MAX_SESSION_EXPIRY_HOURS: u64 = 24 * 366;

/// Simulation engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Session lifetime in hours.
    pub session_expiry_hours: u64,
    /// Maximum timepoints or ranges per scenario.
    pub max_data_points: usize,
    /// Maximum number of live sessions.
    pub max_concurrent_sessions: usize,
    /// Expiry sweeper period in minutes.
    pub cleanup_interval_minutes: u64,
    /// Access records retained per session.
    pub max_history_entries: usize,
    /// How consecutive ranges must meet.
    pub range_adjacency: RangeAdjacency,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            session_expiry_hours: 24,
            max_data_points: 1000,
            max_concurrent_sessions: 100,
            cleanup_interval_minutes: 5,
            max_history_entries: 100,
            range_adjacency: RangeAdjacency::Inclusive,
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field that must be positive is zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Offending field name.
        field: &'static str,
    },

    /// A field exceeds its supported maximum.
    #[error("{field} = {value} exceeds maximum {max}")]
    TooLarge {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: u64,
        /// Supported maximum.
        max: u64,
    },
}

impl SimulationConfig {
    /// Check that every value is usable.
    ///
    /// `max_history_entries` may be zero, which disables access history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_expiry_hours == 0 {
            return Err(ConfigError::Zero { field: "session_expiry_hours" });
        }
        if self.session_expiry_hours > MAX_SESSION_EXPIRY_HOURS {
            return Err(ConfigError::TooLarge {
                field: "session_expiry_hours",
                value: self.session_expiry_hours,
                max: MAX_SESSION_EXPIRY_HOURS,
            });
        }
        if self.max_data_points == 0 {
            return Err(ConfigError::Zero { field: "max_data_points" });
        }
        if self.max_concurrent_sessions == 0 {
            return Err(ConfigError::Zero { field: "max_concurrent_sessions" });
        }
        if self.cleanup_interval_minutes == 0 {
            return Err(ConfigError::Zero { field: "cleanup_interval_minutes" });
        }
        Ok(())
    }

    /// Session lifetime.
    pub fn session_lifetime(&self) -> TimeDelta {
        let hours = self.session_expiry_hours.min(MAX_SESSION_EXPIRY_HOURS).cast_signed();
        TimeDelta::try_hours(hours).unwrap_or(TimeDelta::MAX)
    }

    /// Expiry sweeper period.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes.saturating_mul(60))
    }

    /// Limits for the scenario validator.
    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits { max_points: self.max_data_points, adjacency: self.range_adjacency }
    }

    /// Limits for the session store.
    pub fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            session_lifetime: self.session_lifetime(),
            max_sessions: self.max_concurrent_sessions,
            max_history: self.max_history_entries,
        }
    }
}
