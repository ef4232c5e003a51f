//! Console reporter with a progress bar over matrix cells
//!
//! Report lines go to the reporter's own writer (stdout by default). The
//! bar draws on stderr and is suspended while a line is written, so lines
//! still come out when the bar is hidden.

use crate::models::SimulationEvent;
use crate::report::ReportSink;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

/// Writes report lines while an indicatif progress bar tracks the matrix
pub struct ConsoleReporter<W: Write = io::Stdout> {
    bar: ProgressBar,
    writer: W,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter for a matrix of `total_runs` cells, writing to stdout
    pub fn new(total_runs: u64) -> Self {
        let bar = ProgressBar::new(total_runs);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} runs ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self::with_bar(bar, io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Reporter that draws no bar and writes lines to `writer`
    pub fn hidden(total_runs: u64, writer: W) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_runs);
        Self::with_bar(bar, writer)
    }

    pub fn with_bar(bar: ProgressBar, writer: W) -> Self {
        Self { bar, writer }
    }

    /// Runs reported so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn emit(&mut self, event: &SimulationEvent) -> Result<()> {
        let line = event.summary();
        let writer = &mut self.writer;
        self.bar.suspend(|| -> io::Result<()> {
            writeln!(writer, "{}", line)?;
            writer.flush()
        })?;

        match event {
            SimulationEvent::RunCompleted(result) => {
                self.bar.inc(1);
                self.bar.set_message(format!("{} n={}", result.kind, result.size));
            }
            SimulationEvent::AllComplete(_) => {
                self.bar.finish_and_clear();
            }
        }
        Ok(())
    }
}
