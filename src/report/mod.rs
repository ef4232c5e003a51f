//! Reporting sinks
//!
//! An append-only, ordered output channel for [`SimulationEvent`]s. The
//! scheduler writes one event per completed run and one terminal event; a
//! sink only decides how each event is rendered.

use crate::bench::workload::WorkloadKind;
use crate::models::{RunResult, SimulationEvent};
use crate::Result;
use std::io::{self, Write};

pub mod console;

pub use console::ConsoleReporter;

/// Destination for scheduler events
pub trait ReportSink {
    /// Append one event. Events arrive in traversal order.
    fn emit(&mut self, event: &SimulationEvent) -> Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        (**self).emit(event)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        (**self).emit(event)
    }
}

/// One human-readable line per event
#[derive(Debug)]
pub struct TextReporter<W: Write> {
    writer: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        writeln!(self.writer, "{}", event.summary())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON object per line, for automated analysis
#[derive(Debug)]
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for JsonLinesReporter<W> {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Vec<SimulationEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    /// Completion records, in emission order
    pub fn results(&self) -> impl Iterator<Item = &RunResult> {
        self.events.iter().filter_map(|event| match event {
            SimulationEvent::RunCompleted(result) => Some(result),
            SimulationEvent::AllComplete(_) => None,
        })
    }

    /// `(kind, size, repetition)` of each completion record
    pub fn cells(&self) -> Vec<(WorkloadKind, u32, u32)> {
        self.results().map(RunResult::cell).collect()
    }

    /// Number of terminal records received
    pub fn terminal_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_terminal()).count()
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::workload::WorkloadSpec;
    use crate::models::{RunResult, RunSummary};
    use std::time::Duration;

    fn events() -> Vec<SimulationEvent> {
        vec![
            SimulationEvent::RunCompleted(RunResult::completed(
                WorkloadSpec::new(WorkloadKind::Quadratic, 16),
                0,
                273,
                Duration::from_micros(3),
            )),
            SimulationEvent::AllComplete(RunSummary::new(1, 273, Duration::from_micros(3))),
        ]
    }

    #[test]
    fn test_text_reporter_one_line_per_event() {
        let mut reporter = TextReporter::new(Vec::new());
        for event in &events() {
            reporter.emit(event).unwrap();
        }
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("O(n^2)"));
        assert!(lines[0].contains("size 16"));
        assert!(lines[1].starts_with("All simulations complete"));
    }

    #[test]
    fn test_json_lines_reporter() {
        let mut reporter = JsonLinesReporter::new(Vec::new());
        for event in &events() {
            reporter.emit(event).unwrap();
        }
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let parsed: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["event"], "run_completed");
        assert_eq!(parsed[0]["kind"], "quadratic");
        assert_eq!(parsed[1]["event"], "all_complete");
    }

    #[test]
    fn test_memory_sink_through_boxed_trait_object() {
        let mut memory = MemorySink::new();
        {
            let mut boxed: Box<dyn ReportSink + '_> = Box::new(&mut memory);
            for event in &events() {
                boxed.emit(event).unwrap();
            }
        }
        assert_eq!(memory.events().len(), 2);
        assert_eq!(memory.cells(), vec![(WorkloadKind::Quadratic, 16, 0)]);
        assert_eq!(memory.terminal_count(), 1);
    }
}
