//! NESTBENCH - Nested-loop complexity timing harness
//!
//! Runs synthetic quadratic, quasi-linear-nested and cubic workloads over a
//! deterministic matrix of sizes while keeping a liveness monitor fed, and
//! reports one completion record per run.

use thiserror::Error;

// Public re-exports
pub mod bench;
pub mod config;
pub mod models;
pub mod report;
pub mod util;
pub mod watchdog;

pub use bench::{
    Scheduler, SchedulerEvent, SchedulerState, ScheduleMatrix, StartOutcome, WorkloadKind,
    WorkloadRegistry, WorkloadSpec,
};
pub use config::{OutputFormat, SimulationConfig};
pub use models::{RunOutcome, RunResult, RunSummary, SimulationEvent};
pub use report::{ConsoleReporter, JsonLinesReporter, MemorySink, ReportSink, TextReporter};
pub use watchdog::{LivenessMonitor, PingCounter, SoftwareWatchdog};

/// Common error type for the harness
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Writing to a report sink or reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration validation or lookup error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding of a report record failed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

// Common types and constants
pub const APP_NAME: &str = "nestbench";
pub const CONFIG_FILE: &str = "nestbench.toml";
/// Largest workload size accepted by configuration validation
pub const MAX_SIZE: u32 = 4096;
