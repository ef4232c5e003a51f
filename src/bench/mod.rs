//! Benchmark engine module
//!
//! Contains the schedule matrix, the workload registry and the cooperative
//! scheduler that ties them to a liveness monitor and a report sink.

pub mod matrix;
pub mod scheduler;
pub mod workload;

// Re-export commonly used types
pub use matrix::{MatrixCell, MatrixCursor, ScheduleMatrix};
pub use scheduler::{Scheduler, SchedulerEvent, SchedulerState, StartOutcome};
pub use workload::{WorkloadFn, WorkloadKind, WorkloadRegistry, WorkloadSpec};
