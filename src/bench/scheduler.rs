//! Benchmark scheduler
//!
//! A single cooperative task. It suspends once, waiting for the trigger
//! timer, then walks the whole [`ScheduleMatrix`] in one synchronous pass.
//! The pass has no suspension points, so the only thing keeping the
//! liveness monitor fed is the workload functions pinging at every step.
//!
//! ```text
//! Idle --Start--> WaitingForTrigger --TimerExpired--> Running(cursor) --exhausted--> Done
//!   |                    |                                                            ^
//!   +------Shutdown------+------------------------------------------------------------+
//! ```

use crate::bench::matrix::{MatrixCursor, ScheduleMatrix};
use crate::bench::workload::WorkloadRegistry;
use crate::models::{RunResult, RunSummary, SimulationEvent};
use crate::report::ReportSink;
use crate::watchdog::LivenessMonitor;
use crate::Result;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Created, not started
    #[default]
    Idle,
    /// Trigger timer armed
    WaitingForTrigger,
    /// Executing the cell under the cursor
    Running(MatrixCursor),
    /// Terminal; every further event is a no-op
    Done,
}

/// Events fed to [`Scheduler::handle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Arm the trigger
    Start,
    /// The trigger timer fired
    TimerExpired,
    /// The runtime is shutting down
    Shutdown,
    /// Any other platform event; never consumed as the trigger
    Other,
}

/// Result of [`Scheduler::start`]
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// The trigger fired and the matrix ran to completion
    Completed(RunSummary),
    /// Shutdown arrived before the trigger; nothing was emitted
    Cancelled,
    /// The scheduler had already reached `Done`
    AlreadyDone,
    /// An earlier run stopped on a sink error at this cell; nothing was run
    Stalled(MatrixCursor),
}

/// Drives the benchmark matrix while keeping the liveness monitor fed
pub struct Scheduler<M, S> {
    matrix: ScheduleMatrix,
    registry: WorkloadRegistry,
    monitor: M,
    sink: S,
    state: SchedulerState,
}

impl<M: LivenessMonitor, S: ReportSink> Scheduler<M, S> {
    /// Create an idle scheduler using the built-in workloads
    pub fn new(matrix: ScheduleMatrix, monitor: M, sink: S) -> Self {
        Self {
            matrix,
            registry: WorkloadRegistry::builtin(),
            monitor,
            sink,
            state: SchedulerState::Idle,
        }
    }

    /// Use a custom workload registry
    pub fn with_registry(mut self, registry: WorkloadRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SchedulerState::Done
    }

    pub fn matrix(&self) -> &ScheduleMatrix {
        &self.matrix
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the monitor and the sink
    pub fn into_parts(self) -> (M, S) {
        (self.monitor, self.sink)
    }

    /// Arm the trigger and wait for it, then run the matrix.
    ///
    /// Suspends for `trigger_delay` or until `shutdown` receives a value,
    /// whichever comes first. A dropped shutdown sender is not a shutdown.
    /// Nothing is emitted before the timer expires. Once the scheduler is
    /// `Done`, this returns [`StartOutcome::AlreadyDone`] without side effects;
    /// a scheduler left mid-matrix by a sink error returns
    /// [`StartOutcome::Stalled`] without waiting.
    pub async fn start(
        &mut self,
        trigger_delay: Duration,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<StartOutcome> {
        match self.state {
            SchedulerState::Done => {
                debug!("scheduler already done; start ignored");
                return Ok(StartOutcome::AlreadyDone);
            }
            SchedulerState::Running(cursor) => {
                warn!(?cursor, "scheduler stalled by an earlier sink error; start ignored");
                return Ok(StartOutcome::Stalled(cursor));
            }
            SchedulerState::Idle => {
                self.handle(SchedulerEvent::Start)?;
            }
            SchedulerState::WaitingForTrigger => {}
        }

        tokio::select! {
            _ = tokio::time::sleep(trigger_delay) => {
                match self.handle(SchedulerEvent::TimerExpired)? {
                    Some(summary) => Ok(StartOutcome::Completed(summary)),
                    None => Ok(StartOutcome::AlreadyDone),
                }
            }
            Ok(()) = &mut shutdown => {
                self.handle(SchedulerEvent::Shutdown)?;
                Ok(StartOutcome::Cancelled)
            }
        }
    }

    /// Feed one event to the state machine.
    ///
    /// Returns the run summary when the event ran the matrix.
    pub fn handle(&mut self, event: SchedulerEvent) -> Result<Option<RunSummary>> {
        match (self.state, event) {
            (SchedulerState::Done, _) => {
                trace!(?event, "scheduler done; event ignored");
                Ok(None)
            }
            (SchedulerState::Idle, SchedulerEvent::Start) => {
                self.state = SchedulerState::WaitingForTrigger;
                debug!(cells = self.matrix.len(), "trigger armed");
                Ok(None)
            }
            (SchedulerState::WaitingForTrigger, SchedulerEvent::TimerExpired) => {
                self.run_matrix().map(Some)
            }
            (
                SchedulerState::Idle | SchedulerState::WaitingForTrigger,
                SchedulerEvent::Shutdown,
            ) => {
                warn!("shutdown before trigger; schedule abandoned");
                self.state = SchedulerState::Done;
                Ok(None)
            }
            (state, event) => {
                trace!(?state, ?event, "event ignored");
                Ok(None)
            }
        }
    }

    fn run_matrix(&mut self) -> Result<RunSummary> {
        info!(
            sizes = ?self.matrix.sizes(),
            kinds = ?self.matrix.kinds(),
            repeat_count = self.matrix.repeat_count(),
            "trigger fired; running {} cells",
            self.matrix.len()
        );

        self.monitor.arm();
        let started = Instant::now();
        let mut runs = 0u64;
        let mut pings = 0u64;
        let mut cursor = self.matrix.first();

        while let Some(position) = cursor {
            self.state = SchedulerState::Running(position);
            let result = self.run_cell(position);
            pings += result.pings;
            self.sink.emit(&SimulationEvent::RunCompleted(result))?;
            runs += 1;
            cursor = self.matrix.next(position);
        }

        let summary = RunSummary::new(runs, pings, started.elapsed());
        self.sink.emit(&SimulationEvent::AllComplete(summary.clone()))?;
        self.monitor.ping();
        self.state = SchedulerState::Done;

        info!(
            runs,
            pings,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "all simulations complete"
        );
        Ok(summary)
    }

    fn run_cell(&mut self, position: MatrixCursor) -> RunResult {
        let cell = self.matrix.cell(position);
        let monitor = &mut self.monitor;
        let mut pings = 0u64;

        let started = Instant::now();
        self.registry.invoke(cell.spec, &mut || {
            pings += 1;
            monitor.ping();
        });
        let elapsed = started.elapsed();

        debug!(
            kind = %cell.spec.kind,
            size = cell.spec.size,
            repetition = cell.repetition,
            pings,
            elapsed_us = elapsed.as_micros() as u64,
            "run completed"
        );
        RunResult::completed(cell.spec, cell.repetition, pings, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::workload::WorkloadKind;
    use crate::report::MemorySink;
    use crate::watchdog::PingCounter;
    use crate::HarnessError;
    use std::io;

    fn scheduler(sizes: Vec<u32>, repeat: u32) -> Scheduler<PingCounter, MemorySink> {
        Scheduler::new(
            ScheduleMatrix::new(sizes, WorkloadKind::ALL.to_vec(), repeat),
            PingCounter::new(),
            MemorySink::new(),
        )
    }

    #[test]
    fn test_state_transitions() {
        let mut s = scheduler(vec![2], 1);
        assert_eq!(s.state(), SchedulerState::Idle);

        // the timer cannot fire before the trigger is armed
        assert!(s.handle(SchedulerEvent::TimerExpired).unwrap().is_none());
        assert_eq!(s.state(), SchedulerState::Idle);

        s.handle(SchedulerEvent::Start).unwrap();
        assert_eq!(s.state(), SchedulerState::WaitingForTrigger);

        let summary = s.handle(SchedulerEvent::TimerExpired).unwrap().unwrap();
        assert_eq!(summary.runs, 3);
        assert!(s.is_done());
    }

    #[test]
    fn test_other_events_do_not_trigger() {
        let mut s = scheduler(vec![2], 1);
        s.handle(SchedulerEvent::Start).unwrap();
        s.handle(SchedulerEvent::Other).unwrap();
        s.handle(SchedulerEvent::Start).unwrap();
        assert_eq!(s.state(), SchedulerState::WaitingForTrigger);
        assert!(s.sink().events().is_empty());
        assert_eq!(s.monitor().count(), 0);
    }

    #[test]
    fn test_done_absorbs_events() {
        let mut s = scheduler(vec![2], 1);
        s.handle(SchedulerEvent::Start).unwrap();
        s.handle(SchedulerEvent::TimerExpired).unwrap();
        let emitted = s.sink().events().len();
        let pings = s.monitor().count();

        for event in [
            SchedulerEvent::Start,
            SchedulerEvent::TimerExpired,
            SchedulerEvent::Shutdown,
            SchedulerEvent::Other,
        ] {
            assert!(s.handle(event).unwrap().is_none());
        }
        assert_eq!(s.sink().events().len(), emitted);
        assert_eq!(s.monitor().count(), pings);
    }

    #[test]
    fn test_monitor_receives_every_workload_ping_plus_final() {
        let mut s = scheduler(vec![3, 5], 2);
        s.handle(SchedulerEvent::Start).unwrap();
        let summary = s.handle(SchedulerEvent::TimerExpired).unwrap().unwrap();

        let expected: u64 = [3u32, 5]
            .iter()
            .flat_map(|&n| WorkloadKind::ALL.map(|k| 2 * k.expected_pings(n)))
            .sum();
        assert_eq!(summary.pings, expected);
        assert_eq!(s.monitor().count(), expected + 1);

        let per_run: u64 = s.sink().results().map(|r| r.pings).sum();
        assert_eq!(per_run, expected);
    }

    #[test]
    fn test_shutdown_before_trigger_emits_nothing() {
        let mut s = scheduler(vec![2], 1);
        s.handle(SchedulerEvent::Start).unwrap();
        s.handle(SchedulerEvent::Shutdown).unwrap();
        assert!(s.is_done());
        assert!(s.sink().events().is_empty());
        assert_eq!(s.monitor().count(), 0);
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn emit(&mut self, _event: &SimulationEvent) -> Result<()> {
            Err(HarnessError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "closed")))
        }
    }

    #[test]
    fn test_sink_error_stops_the_run() {
        let mut s = Scheduler::new(
            ScheduleMatrix::new(vec![2, 4], vec![WorkloadKind::Quadratic], 1),
            PingCounter::new(),
            FailingSink,
        );
        s.handle(SchedulerEvent::Start).unwrap();
        let err = s.handle(SchedulerEvent::TimerExpired).unwrap_err();
        assert!(matches!(err, HarnessError::Io(_)));
        assert_eq!(
            s.state(),
            SchedulerState::Running(MatrixCursor {
                size_idx: 0,
                kind_idx: 0,
                repetition: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_start_after_sink_error_returns_immediately() {
        let mut s = Scheduler::new(
            ScheduleMatrix::new(vec![2], vec![WorkloadKind::Quadratic], 1),
            PingCounter::new(),
            FailingSink,
        );
        let (_tx, rx) = oneshot::channel();
        assert!(s.start(Duration::from_millis(1), rx).await.is_err());
        let pings = s.monitor().count();

        let (_tx, rx) = oneshot::channel();
        let started = Instant::now();
        let outcome = s.start(Duration::from_secs(30), rx).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        let stalled_at = MatrixCursor {
            size_idx: 0,
            kind_idx: 0,
            repetition: 0,
        };
        assert!(matches!(outcome, StartOutcome::Stalled(cursor) if cursor == stalled_at));
        assert_eq!(s.state(), SchedulerState::Running(stalled_at));
        assert_eq!(s.monitor().count(), pings);
    }

    #[tokio::test]
    async fn test_start_runs_after_delay() {
        let mut s = scheduler(vec![4], 1);
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();
        let started = Instant::now();
        let outcome = s.start(Duration::from_millis(20), shutdown_rx).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(matches!(outcome, StartOutcome::Completed(ref summary) if summary.runs == 3));
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_is_not_a_shutdown() {
        let mut s = scheduler(vec![4], 1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        drop(shutdown_tx);
        let outcome = s.start(Duration::from_millis(5), shutdown_rx).await.unwrap();
        assert!(matches!(outcome, StartOutcome::Completed(_)));
    }
}
