//! Elephant simulation server.
//!
//! This crate provides the stateful half of the simulation engine:
//! - An in-memory, concurrent session store with derived expiry
//! - A periodic expiry sweeper running on tokio
//! - The `SimulationService` facade consumed by the HTTP layer
//! - System time and cryptographic RNG
//!
//! ## Architecture
//!
//! ```text
//! elephant-server
//!   ├─ SystemEnv          (production Environment impl)
//!   ├─ SimulationService  (validate → store → playback)
//!   ├─ SessionStore       (sessions, capacity, access tracking)
//!   └─ ExpirySweeper      (periodic reclamation)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod simulation;
mod store;
mod sweeper;
mod system_env;
#[cfg(test)]
mod test_env;

use std::{future::Future, sync::Arc};

pub use config::{ConfigError, SimulationConfig};
use elephant_core::Environment;
pub use error::ServerError;
pub use simulation::{
    CurrentValue, ErrorClass, SessionDetail, SessionList, SessionStatus, SimulationError,
    SimulationService, StepValue,
};
pub use store::{
    AccessRecord, PlaybackPoint, Session, SessionError, SessionId, SessionStore, SessionSummary,
    StepMode, StoreLimits,
};
pub use sweeper::ExpirySweeper;
pub use system_env::SystemEnv;
use tokio::sync::watch;

/// Simulation server runtime.
///
/// Owns the shared `SimulationService` and drives its expiry sweeper until
/// shutdown. Request handlers obtain the service through [`Server::service`].
pub struct Server<E = SystemEnv>
where
    E: Environment,
{
    service: Arc<SimulationService<E>>,
}

impl Server<SystemEnv> {
    /// Create a server using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the configuration is invalid.
    pub fn new(config: &SimulationConfig) -> Result<Self, ServerError> {
        Self::with_env(SystemEnv::new(), config)
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(tokio::signal::ctrl_c()).await
    }
}

impl<E> Server<E>
where
    E: Environment,
{
    /// Create a server with an explicit environment.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the configuration is invalid.
    pub fn with_env(env: E, config: &SimulationConfig) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self { service: Arc::new(SimulationService::new(env, config)) })
    }

    /// Shared handle to the simulation service.
    pub fn service(&self) -> Arc<SimulationService<E>> {
        Arc::clone(&self.service)
    }

    /// Run the expiry sweeper until `shutdown` resolves.
    ///
    /// The sweeper is stopped and awaited before returning.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = tokio::spawn(self.service.sweeper().run(shutdown_rx));

        tracing::info!("Simulation server running");

        let signal = shutdown.await;
        tracing::info!("Shutdown requested");

        let _ = shutdown_tx.send(true);
        let reclaimed = sweeper.await.map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!(
            reclaimed,
            live_sessions = self.service.store().live_count(),
            "Simulation server stopped"
        );

        signal.map_err(ServerError::from)
    }
}

impl<E> std::fmt::Debug for Server<E>
where
    E: Environment,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("service", &self.service).finish()
    }
}
