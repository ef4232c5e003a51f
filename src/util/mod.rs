//! Utility functions module
//!
//! Contains helpers for formatting durations and step rates.

pub mod units;

// Re-export commonly used functions
pub use units::{calculate_step_rate, format_duration, format_step_rate};
