//! Masked copy pipeline
//!
//! This module provides the orchestrator that drives one run through the
//! state machine, and the result type it returns.

pub mod orchestrator;
pub mod state;
pub mod summary;

pub use orchestrator::{Pipeline, PipelineOptions};
pub use state::{PipelineState, StateTracker};
pub use summary::{RunFailure, RunResult};
