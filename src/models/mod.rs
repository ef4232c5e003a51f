//! Data models module
//!
//! Completion records and the terminal summary emitted by the scheduler.

pub mod result;

// Re-export commonly used types
pub use result::{RunOutcome, RunResult, RunSummary, SimulationEvent};
