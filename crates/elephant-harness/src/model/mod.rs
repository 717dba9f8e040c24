//! Reference model for model-based testing.
//!
//! The model is a deliberately naive session store: a vector of sessions, a
//! seconds counter for the clock, and linear scans for every query. It serves
//! as the oracle against which `SimulationService` is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Observable behavior only: ids, locking and history are not modeled
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod store;

pub use operation::{
    Operation, OperationError, OperationResult, ScenarioShape, SlotId, step_budget,
};
pub use store::{ModelStore, ObservableState};
