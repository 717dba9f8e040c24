//! Deterministic simulation harness for the Elephant session store.
//!
//! Provides a virtual-clock, seeded-RNG implementation of `Environment` so
//! that expiry, identifier generation and sweeper scheduling replay exactly.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and the real
//! `SimulationService`, and their results and observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_env;

pub use model::{
    ModelStore, ObservableState, Operation, OperationError, OperationResult, ScenarioShape,
    SlotId, step_budget,
};
pub use sim_env::SimEnv;
