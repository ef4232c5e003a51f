//! Workload function registry
//!
//! Each [`WorkloadKind`] maps to a deterministic nested-loop function whose
//! step count follows the kind's complexity class. The functions perform no
//! arithmetic of their own: every loop step is one call to the liveness
//! callback, which is what keeps the monitor fed during long runs.

use crate::HarnessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hint::black_box;
use std::str::FromStr;

/// Signature of a workload function: `(size, ping)`.
///
/// Implementations must call `ping` at every step of their innermost loop
/// and at least once per call, and must produce the same number of pings for
/// the same `size` every time.
pub type WorkloadFn = fn(u32, &mut dyn FnMut());

/// Complexity class simulated by a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// Two nested loops, Θ(n²) steps
    Quadratic,
    /// Two nested loops around a halving loop, Θ(n² log n) steps
    QuasiLinearNested,
    /// Three nested loops, Θ(n³) steps
    Cubic,
}

impl WorkloadKind {
    /// Every kind, in declaration order
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Quadratic,
        WorkloadKind::QuasiLinearNested,
        WorkloadKind::Cubic,
    ];

    /// Position of this kind in [`WorkloadKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used in configuration files and on the command line
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadKind::Quadratic => "quadratic",
            WorkloadKind::QuasiLinearNested => "quasi-linear-nested",
            WorkloadKind::Cubic => "cubic",
        }
    }

    /// Big-O notation for report lines
    pub fn complexity(&self) -> &'static str {
        match self {
            WorkloadKind::Quadratic => "O(n^2)",
            WorkloadKind::QuasiLinearNested => "O(n^2 log n)",
            WorkloadKind::Cubic => "O(n^3)",
        }
    }

    /// Exact number of pings the built-in workload for this kind makes at `size`.
    ///
    /// Saturates at `u64::MAX` for sizes far beyond [`crate::MAX_SIZE`].
    pub fn expected_pings(&self, size: u32) -> u64 {
        let n = size as u64;
        let square = n * n;
        match self {
            WorkloadKind::Quadratic => 1 + n + square,
            WorkloadKind::QuasiLinearNested => {
                let halvings = if n > 1 { n.ilog2() as u64 } else { 0 };
                (1 + n).saturating_add(square.saturating_mul(1 + halvings))
            }
            WorkloadKind::Cubic => (1 + n + square).saturating_add(square.saturating_mul(n)),
        }
    }

    /// Built-in workload function for this kind
    pub fn builtin(&self) -> WorkloadFn {
        match self {
            WorkloadKind::Quadratic => simulate_quadratic,
            WorkloadKind::QuasiLinearNested => simulate_quasi_linear_nested,
            WorkloadKind::Cubic => simulate_cubic,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkloadKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quadratic" | "n2" => Ok(WorkloadKind::Quadratic),
            "quasi-linear-nested" | "n2logn" => Ok(WorkloadKind::QuasiLinearNested),
            "cubic" | "n3" => Ok(WorkloadKind::Cubic),
            other => Err(HarnessError::Config(format!(
                "Unknown workload kind: {} (expected quadratic, quasi-linear-nested or cubic)",
                other
            ))),
        }
    }
}

/// One workload invocation: which function, at which size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub kind: WorkloadKind,
    pub size: u32,
}

impl WorkloadSpec {
    pub fn new(kind: WorkloadKind, size: u32) -> Self {
        Self { kind, size }
    }
}

/// Dispatch table from [`WorkloadKind`] to workload function
#[derive(Debug, Clone, Copy)]
pub struct WorkloadRegistry {
    table: [WorkloadFn; WorkloadKind::ALL.len()],
}

impl WorkloadRegistry {
    /// Registry with the built-in nested-loop workloads
    pub fn builtin() -> Self {
        Self {
            table: WorkloadKind::ALL.map(|kind| kind.builtin()),
        }
    }

    /// Replace the function registered for `kind`
    pub fn with_workload(mut self, kind: WorkloadKind, workload: WorkloadFn) -> Self {
        self.table[kind.index()] = workload;
        self
    }

    /// Function registered for `kind`
    pub fn get(&self, kind: WorkloadKind) -> WorkloadFn {
        self.table[kind.index()]
    }

    /// Run the workload described by `spec`, forwarding its pings
    pub fn invoke(&self, spec: WorkloadSpec, ping: &mut dyn FnMut()) {
        (self.get(spec.kind))(spec.size, ping)
    }
}

impl Default for WorkloadRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Θ(n²): ping per outer and per inner iteration
pub fn simulate_quadratic(size: u32, ping: &mut dyn FnMut()) {
    ping();
    for i in 0..size {
        black_box(i);
        ping();
        for j in 0..size {
            black_box(j);
            ping();
        }
    }
}

/// Θ(n² log n): the quadratic body with a halving loop inside
pub fn simulate_quasi_linear_nested(size: u32, ping: &mut dyn FnMut()) {
    ping();
    for i in 0..size {
        black_box(i);
        ping();
        for j in 0..size {
            black_box(j);
            ping();
            let mut m = size;
            while m > 1 {
                m = black_box(m / 2);
                ping();
            }
        }
    }
}

/// Θ(n³): ping at every level of three nested loops
pub fn simulate_cubic(size: u32, ping: &mut dyn FnMut()) {
    ping();
    for i in 0..size {
        black_box(i);
        ping();
        for j in 0..size {
            black_box(j);
            ping();
            for k in 0..size {
                black_box(k);
                ping();
            }
        }
    }
}
