//! Run result data models
//!
//! Records emitted by the scheduler: one per completed workload run, and one
//! summary once the whole matrix is exhausted.

use crate::bench::workload::{WorkloadKind, WorkloadSpec};
use crate::util::units::{calculate_step_rate, format_duration, format_step_rate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a workload run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
}

/// Completion record for one matrix cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub kind: WorkloadKind,
    pub size: u32,
    pub repetition: u32,
    pub outcome: RunOutcome,
    /// Liveness pings made by the workload during this run
    pub pings: u64,
    /// Wall-clock time spent inside the workload function
    #[serde(rename = "elapsed_ns", with = "duration_serde")]
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    /// Record a completed run of `spec`
    pub fn completed(spec: WorkloadSpec, repetition: u32, pings: u64, elapsed: Duration) -> Self {
        Self {
            kind: spec.kind,
            size: spec.size,
            repetition,
            outcome: RunOutcome::Completed,
            pings,
            elapsed,
            finished_at: Utc::now(),
        }
    }

    /// The deterministic part of the record: `(kind, size, repetition)`.
    /// Two runs of the same configuration yield the same sequence of cells.
    pub fn cell(&self) -> (WorkloadKind, u32, u32) {
        (self.kind, self.size, self.repetition)
    }

    /// Steps (pings) per second
    pub fn step_rate(&self) -> f64 {
        calculate_step_rate(self.pings, self.elapsed)
    }

    /// One human-readable report line
    pub fn summary(&self) -> String {
        format!(
            "Complexity {} finished run {} for size {} ({} steps in {}, {})",
            self.kind.complexity(),
            self.repetition,
            self.size,
            self.pings,
            format_duration(self.elapsed),
            format_step_rate(self.step_rate())
        )
    }
}

/// Terminal record emitted once the matrix is exhausted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Completion records emitted
    pub runs: u64,
    /// Pings across all runs, excluding the final one after the summary
    pub pings: u64,
    /// Time from trigger to the end of the last run
    #[serde(rename = "elapsed_ns", with = "duration_serde")]
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(runs: u64, pings: u64, elapsed: Duration) -> Self {
        Self {
            runs,
            pings,
            elapsed,
            finished_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "All simulations complete: {} runs, {} steps in {}",
            self.runs,
            self.pings,
            format_duration(self.elapsed)
        )
    }
}

/// Record written to a report sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    RunCompleted(RunResult),
    AllComplete(RunSummary),
}

impl SimulationEvent {
    pub fn summary(&self) -> String {
        match self {
            SimulationEvent::RunCompleted(result) => result.summary(),
            SimulationEvent::AllComplete(summary) => summary.summary(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationEvent::AllComplete(_))
    }
}

// Durations are written as integer nanoseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
